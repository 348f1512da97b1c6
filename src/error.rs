//! B2F handshake error types.
//!
//! Every failure terminates the handshake; nothing is retried at this layer.
//! Callers that own the transport decide what to do next:
//!
//! - [`B2FError::Io`] is the underlying stream failing and is passed through
//!   untouched.
//! - [`B2FError::NoB2F`] means the remote station speaks an older FBB dialect.
//!   It is kept separate so a caller can fall back to a legacy protocol.
//! - [`B2FError::MissingPasswordSource`] and [`B2FError::MissingResponseHasher`]
//!   are local configuration problems, not protocol violations.

use thiserror::Error;

/// Boxed error returned by an injected password source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// B2F handshake errors.
#[derive(Error, Debug)]
pub enum B2FError {
    /// The remote never sent a capability (SID) line.
    #[error("No sid in handshake")]
    NoSid,

    /// The remote SID lacks the compressed protocol v2 token.
    #[error("Remote does not support B2 Forwarding Protocol")]
    NoB2F,

    /// A line containing `[` did not have the `[name-version-codes]` shape.
    #[error("Bad SID line: {0}")]
    MalformedSid(String),

    /// A forwarder line lacked the `;FW: ` prefix.
    #[error("Malformed forward line: {0}")]
    MalformedForwarder(String),

    /// A secure login challenge arrived but no password source is registered.
    #[error("Got secure login challenge, please register a password source")]
    MissingPasswordSource,

    /// A secure login challenge arrived but no response hasher is registered.
    #[error("Got secure login challenge, please register a response hasher")]
    MissingResponseHasher,

    /// The password source failed (for example the user cancelled the prompt).
    #[error("Password retrieval failed: {0}")]
    PasswordRetrieval(#[source] BoxError),

    /// The remote station reported an error as a `***` line.
    #[error("Remote error: {0}")]
    Remote(String),

    /// Operation not valid in the current session state.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error on the underlying stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for B2F operations
pub type Result<T> = std::result::Result<T, B2FError>;

impl From<toml::de::Error> for B2FError {
    fn from(err: toml::de::Error) -> Self {
        B2FError::Config(err.to_string())
    }
}

/// Reports whether the error is known to mean that secure login failed.
///
/// The protocol has no status code for this at the handshake stage, the
/// remote only sends free text, so this is a case-insensitive substring match.
pub fn is_login_failure(err: &B2FError) -> bool {
    err.to_string()
        .to_lowercase()
        .contains("secure login failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failure_detected_in_remote_text() {
        let err = B2FError::Remote("Secure login failed - account password does not match".into());
        assert!(is_login_failure(&err));

        let err = B2FError::Remote("SECURE LOGIN FAILED".into());
        assert!(is_login_failure(&err));
    }

    #[test]
    fn test_other_errors_are_not_login_failures() {
        assert!(!is_login_failure(&B2FError::NoSid));
        assert!(!is_login_failure(&B2FError::Remote("Timeout".into())));
        assert!(!is_login_failure(&B2FError::MissingPasswordSource));
    }

    #[test]
    fn test_io_error_passes_through() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "link down");
        let err: B2FError = io.into();
        match err {
            B2FError::Io(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
