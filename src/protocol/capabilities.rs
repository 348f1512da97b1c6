//! SID codes: the capability announcement exchanged during the handshake.
//!
//! Each station announces itself with a line such as
//! `[WL2K-2.8.4.8-B2FWIHJM$]`. The run of codes after the last `-` lists the
//! protocol features it supports.

use std::fmt;
use std::io::Write;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{B2FError, Result};

lazy_static! {
    /// Greedy on both sides so hyphens in the name or version are skipped.
    static ref SID_REGEX: Regex = Regex::new(r"\[.*-(.*)\]").expect("valid SID pattern");
}

/// Known SID codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Acknowledge for personal messages
    AckForPersonal,
    /// FBB basic ascii protocol
    FbbBasic,
    /// FBB compressed protocol v0
    FbbCompressed0,
    /// FBB compressed protocol v1
    FbbCompressed1,
    /// FBB compressed protocol v2 (aka B2F)
    FbbCompressed2,
    /// Hierarchical location designators
    HierarchicalLocation,
    /// Message identifiers
    MessageId,
    /// Compressed batch forwarding
    CompressedBatch,
    /// Identify; some stations send `;target de mycall QTC n` when present
    Identify,
    /// BID supported. Must be the last code in a SID.
    Bid,
    /// Gzip compressed messages (experimental)
    Gzip,
}

impl Capability {
    /// Wire code for this capability
    pub fn code(self) -> &'static str {
        match self {
            Self::AckForPersonal => "A",
            Self::FbbBasic => "F",
            Self::FbbCompressed0 => "B",
            Self::FbbCompressed1 => "B1",
            Self::FbbCompressed2 => "B2",
            Self::HierarchicalLocation => "H",
            Self::MessageId => "M",
            Self::CompressedBatch => "X",
            Self::Identify => "I",
            Self::Bid => "$",
            Self::Gzip => "G",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "A" => Self::AckForPersonal,
            "F" => Self::FbbBasic,
            "B" => Self::FbbCompressed0,
            "B1" => Self::FbbCompressed1,
            "B2" => Self::FbbCompressed2,
            "H" => Self::HierarchicalLocation,
            "M" => Self::MessageId,
            "X" => Self::CompressedBatch,
            "I" => Self::Identify,
            "$" => Self::Bid,
            "G" => Self::Gzip,
            _ => return None,
        })
    }
}

/// Codes this implementation announces, in wire order. `Bid` stays last.
pub const LOCAL_CAPABILITIES: [Capability; 5] = [
    Capability::FbbCompressed2,
    Capability::FbbBasic,
    Capability::HierarchicalLocation,
    Capability::MessageId,
    Capability::Bid,
];

/// Application name and version shown in the SID line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAgent {
    /// Application name
    pub name: String,
    /// Application version
    pub version: String,
}

impl UserAgent {
    /// Create a user agent
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

impl Default for UserAgent {
    fn default() -> Self {
        Self::new("b2f", crate::VERSION)
    }
}

/// A station's SID code run, stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sid(String);

impl Sid {
    /// The SID announced by this implementation.
    ///
    /// With `gzip` set the experimental `G` code is placed right before the
    /// terminating `$`.
    pub fn local(gzip: bool) -> Self {
        let mut caps = LOCAL_CAPABILITIES.to_vec();
        if gzip {
            caps.insert(caps.len() - 1, Capability::Gzip);
        }
        Self(caps.iter().map(|c| c.code()).collect())
    }

    /// Extract the SID codes from a `[name-version-codes]` line.
    pub fn parse(line: &str) -> Result<Self> {
        let codes = SID_REGEX
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_uppercase())
            .ok_or_else(|| B2FError::MalformedSid(line.to_string()))?;

        Ok(Self(codes))
    }

    /// Raw substring test against the code run.
    ///
    /// This is not token aware: `has("B")` is true for a SID holding only
    /// `B2`. Remote stations have always been judged this way, so it stays.
    /// Use [`Sid::supports`] for an exact match.
    pub fn has(&self, code: &str) -> bool {
        self.0.contains(&code.to_uppercase())
    }

    /// Token-aware capability check.
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Split the code run into known capabilities.
    ///
    /// `B` followed by a digit forms one code, everything else is a single
    /// character. Unknown codes are skipped.
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut caps = Vec::new();
        let mut chars = self.0.chars().peekable();

        while let Some(c) = chars.next() {
            let mut code = c.to_string();
            if c == 'B' {
                if let Some(d) = chars.next_if(char::is_ascii_digit) {
                    code.push(d);
                }
            }
            match Capability::from_code(&code) {
                Some(cap) => caps.push(cap),
                None => tracing::debug!("Unknown SID code {code:?}"),
            }
        }

        caps
    }

    /// The uppercased code run
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render the local SID line, including the trailing `\r`.
pub fn encode_sid(ua: &UserAgent, gzip: bool) -> String {
    format!("[{}-{}-{}]\r", ua.name, ua.version, Sid::local(gzip))
}

/// Write the local SID line.
pub fn write_sid<W: Write>(w: &mut W, ua: &UserAgent, gzip: bool) -> Result<()> {
    w.write_all(encode_sid(ua, gzip).as_bytes())?;
    Ok(())
}

/// Parse a remote SID line and require B2F support.
pub fn decode_remote_sid(line: &str) -> Result<Sid> {
    let sid = Sid::parse(line)?;

    // We require FBB compressed protocol v2 for now
    if !sid.has(Capability::FbbCompressed2.code()) {
        tracing::warn!("Remote SID {sid} lacks B2F support");
        return Err(B2FError::NoB2F);
    }

    Ok(sid)
}
