//! `;FW:` forwarder lines.
//!
//! A station lists every address it wants messages for:
//!
//! ```text
//! ;FW: N0CALL N0CALL-10|48151623 LA1XYZ|48151623
//! ```
//!
//! The `|hash` suffix carries the secure login response for auxiliary
//! addresses. The primary (first) address is authenticated by the separate
//! `;PR:` line instead.

use std::io::Write;

use super::address::Address;
use crate::error::{B2FError, Result};

/// Prefix of a forwarder line as it must appear when parsed
pub const FW_PREFIX: &str = ";FW: ";

/// Parse a remote forwarder line into its addresses.
///
/// Password hashes attached to entries are accepted but dropped. The
/// remainder is split on single spaces, so doubled spaces yield empty
/// callsigns just as they appear on the wire.
pub fn parse_fw(line: &str) -> Result<Vec<Address>> {
    let rest = line
        .strip_prefix(FW_PREFIX)
        .ok_or_else(|| B2FError::MalformedForwarder(line.to_string()))?;

    Ok(rest
        .split(' ')
        .map(|entry| Address::new(entry.split('|').next().unwrap_or_default()))
        .collect())
}

/// Write the local forwarder line.
///
/// With a non-empty `secure_resp` every address except the first gets
/// `|<secure_resp>` appended.
pub fn write_fw<W: Write>(w: &mut W, addrs: &[Address], secure_resp: Option<&str>) -> Result<()> {
    let secure_resp = secure_resp.filter(|r| !r.is_empty());

    w.write_all(b";FW:")?;
    for (i, addr) in addrs.iter().enumerate() {
        match secure_resp {
            // TODO: individual passwords per auxiliary address
            Some(resp) if i > 0 => write!(w, " {}|{}", addr.callsign, resp)?,
            _ => write!(w, " {}", addr.callsign)?,
        }
    }
    w.write_all(b"\r")?;

    Ok(())
}
