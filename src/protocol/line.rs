//! Carriage-return terminated line reading.

use std::io::{self, BufRead};

use crate::error::{B2FError, Result};

/// Return the next byte without consuming it.
pub fn peek_byte<R: BufRead>(reader: &mut R) -> Result<u8> {
    let buf = reader.fill_buf()?;
    match buf.first() {
        Some(&b) => Ok(b),
        None => Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
    }
}

/// Read the next `\r` terminated line with surrounding whitespace trimmed.
///
/// With `parse_remote_err` set, a line starting with `*` (e.g.
/// `*** Secure login failed`) is returned as [`B2FError::Remote`] holding the
/// text after the last `*`.
pub fn next_line<R: BufRead>(reader: &mut R, parse_remote_err: bool) -> Result<String> {
    let mut buf = Vec::new();
    if reader.read_until(b'\r', &mut buf)? == 0 {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }

    let line = String::from_utf8_lossy(&buf).trim().to_string();
    tracing::debug!("<< {line}");

    if parse_remote_err {
        if let Some(err) = remote_error(&line) {
            return Err(err);
        }
    }

    Ok(line)
}

fn remote_error(line: &str) -> Option<B2FError> {
    if !line.starts_with('*') {
        return None;
    }
    let idx = line.rfind('*')?;
    Some(B2FError::Remote(line[idx + 1..].trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_peek_does_not_consume() {
        let mut rd = Cursor::new(b"FF\r".to_vec());
        assert_eq!(peek_byte(&mut rd).unwrap(), b'F');
        assert_eq!(peek_byte(&mut rd).unwrap(), b'F');
        assert_eq!(next_line(&mut rd, false).unwrap(), "FF");
    }

    #[test]
    fn test_peek_eof() {
        let mut rd = Cursor::new(Vec::new());
        match peek_byte(&mut rd).unwrap_err() {
            B2FError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lines_are_trimmed() {
        let mut rd = Cursor::new(b"first \r\nsecond\r".to_vec());
        assert_eq!(next_line(&mut rd, false).unwrap(), "first");
        assert_eq!(next_line(&mut rd, false).unwrap(), "second");
    }

    #[test]
    fn test_unterminated_last_line() {
        let mut rd = Cursor::new(b"tail".to_vec());
        assert_eq!(next_line(&mut rd, false).unwrap(), "tail");
        assert!(next_line(&mut rd, false).is_err());
    }

    #[test]
    fn test_remote_error_line() {
        let mut rd = Cursor::new(b"*** Secure login failed - bad password\r".to_vec());
        match next_line(&mut rd, true).unwrap_err() {
            B2FError::Remote(msg) => assert_eq!(msg, "Secure login failed - bad password"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_remote_error_ignored_when_not_parsing() {
        let mut rd = Cursor::new(b"*** MTD Stats Total connects = 2580\r".to_vec());
        assert_eq!(
            next_line(&mut rd, false).unwrap(),
            "*** MTD Stats Total connects = 2580"
        );
    }
}
