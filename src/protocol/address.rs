//! Station addresses exchanged in forwarder lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A station callsign, optionally with an SSID (e.g. `N0CALL-10`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Callsign as sent on the wire
    pub callsign: String,
}

impl Address {
    /// Create an address from a callsign
    pub fn new(callsign: &str) -> Self {
        Self {
            callsign: callsign.to_string(),
        }
    }
}

impl From<&str> for Address {
    fn from(callsign: &str) -> Self {
        Self::new(callsign)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.callsign)
    }
}
