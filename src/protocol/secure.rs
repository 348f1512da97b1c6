//! Secure login challenge/response.
//!
//! A station that wants the peer to prove its identity sends
//! `;PQ: <challenge>`. The peer answers with `;PR: <response>`, where the
//! response is derived from the challenge and the account password, so the
//! password itself never crosses the link.
//!
//! Both ends of the computation are injected per session:
//!
//! - a [`PasswordSource`] supplies the password, possibly by prompting a user
//! - a [`ResponseHasher`] turns `(challenge, password)` into the response

use std::io::Write;

use crate::error::{B2FError, BoxError, Result};

/// Prefix of a secure login challenge line
pub const CHALLENGE_PREFIX: &str = ";PQ";

/// Supplies the account password when a challenge arrives.
pub trait PasswordSource {
    /// Return the password, or an error to abort the handshake.
    fn password(&mut self) -> std::result::Result<String, BoxError>;
}

impl<F> PasswordSource for F
where
    F: FnMut() -> std::result::Result<String, BoxError>,
{
    fn password(&mut self) -> std::result::Result<String, BoxError> {
        self()
    }
}

/// Computes the secure login response for a challenge.
pub trait ResponseHasher {
    /// Hash `challenge` with `password` into the response string.
    fn respond(&self, challenge: &str, password: &str) -> String;
}

impl<F> ResponseHasher for F
where
    F: Fn(&str, &str) -> String,
{
    fn respond(&self, challenge: &str, password: &str) -> String {
        self(challenge, password)
    }
}

/// Challenge payload of a `;PQ` line: everything after the fifth character.
pub fn parse_challenge(line: &str) -> String {
    line.get(5..).unwrap_or_default().to_string()
}

/// Obtain the password and compute the response to `challenge`.
///
/// The source is asked exactly once and the hasher is called exactly once.
pub fn secure_login_response(
    challenge: &str,
    source: &mut dyn PasswordSource,
    hasher: &dyn ResponseHasher,
) -> Result<String> {
    let password = source.password().map_err(B2FError::PasswordRetrieval)?;
    Ok(hasher.respond(challenge, &password))
}

/// Write the standalone `;PR:` response line.
pub fn write_secure_response<W: Write>(w: &mut W, response: &str) -> Result<()> {
    write!(w, ";PR: {response}\r")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn concat(challenge: &str, password: &str) -> String {
        format!("{challenge}:{password}")
    }

    #[test]
    fn test_parse_challenge() {
        assert_eq!(parse_challenge(";PQ: 12345"), "12345");
        assert_eq!(parse_challenge(";PQ: "), "");
        assert_eq!(parse_challenge(";PQ"), "");
    }

    #[test]
    fn test_response_uses_challenge_and_password() {
        let mut source = || -> std::result::Result<String, BoxError> { Ok("secret".into()) };
        let resp = secure_login_response("12345", &mut source, &concat).unwrap();
        assert_eq!(resp, "12345:secret");
    }

    #[test]
    fn test_source_called_once() {
        let calls = Cell::new(0);
        let mut source = || -> std::result::Result<String, BoxError> {
            calls.set(calls.get() + 1);
            Ok("pw".into())
        };
        secure_login_response("1", &mut source, &concat).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_source_failure_aborts() {
        let mut source = || -> std::result::Result<String, BoxError> { Err("cancelled".into()) };
        let err = secure_login_response("1", &mut source, &concat).unwrap_err();
        match err {
            B2FError::PasswordRetrieval(e) => assert_eq!(e.to_string(), "cancelled"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_write_response_line() {
        let mut out = Vec::new();
        write_secure_response(&mut out, "RESP").unwrap();
        assert_eq!(out, b";PR: RESP\r");
    }
}
