//! B2F session handshake.
//!
//! Implements the handshake that opens every B2 Forwarding session between
//! two Winlink/FBB stations, before any proposal or message is exchanged.
//!
//! # Protocol Overview
//!
//! The handshake is a carriage-return terminated line exchange. The master
//! (the side that answered the connection) speaks first; the client answers.
//!
//! ## Message Flow
//!
//! ```text
//! Client                                  Master
//!    |                                       |
//!    |<------- MOTD lines -------------------|  Free text
//!    |<------- [WL2K-5.0-B2FWIHJM$] ---------|  SID
//!    |<------- ;PQ: 23753528 ----------------|  Secure login challenge
//!    |<------- CMS via N0CALL > -------------|  Prompt
//!    |                                       |
//!    |-------- ;FW: N0CALL N0CALL-1|resp --->|  Forward requests
//!    |-------- [PATApp-1.0-B2FHM$] --------->|  SID
//!    |-------- ;PR: 72768415 --------------->|  Secure login response
//!    |-------- ; REMOTE DE N0CALL (JO59) --->|  Trailer
//!    |                                       |
//!    |======== FC / FF / FQ commands =======>|  Forwarding stage
//! ```
//!
//! ## Lines
//!
//! | Line       | Format                                   | Sent by      |
//! |------------|------------------------------------------|--------------|
//! | SID        | `[<name>-<version>-<codes>]`             | both         |
//! | Forwarders | `;FW: call1[\|hash] call2[\|hash] ...`   | both         |
//! | Challenge  | `;PQ: <challenge>`                       | challenger   |
//! | Response   | `;PR: <response>`                        | responder    |
//! | Trailer    | `; <target> DE <mycall> (<locator>)[>]`  | both         |
//! | MOTD       | free text                                | master only  |
//!
//! ## Termination
//!
//! A side stops reading the remote handshake when it sees a prompt line
//! (ending in `>`) or when the next line starts with `F`, the first byte of
//! every forwarding command.
//!
//! # Usage
//!
//! ```rust,ignore
//! use b2f::protocol::{Role, Session};
//!
//! let mut session = Session::new(Role::Client, "N0CALL", "LA1B", "JO59")
//!     .with_password_source(|| Ok(prompt_password()?))
//!     .with_response_hasher(winlink_response);
//!
//! session.handshake(&mut reader, &mut writer)?;
//! assert!(session.remote_sid().unwrap().has("B2"));
//! ```

mod address;
mod capabilities;
mod forwarder;
mod line;
mod secure;
mod session;

pub use address::Address;
pub use capabilities::{
    decode_remote_sid, encode_sid, write_sid, Capability, Sid, UserAgent, LOCAL_CAPABILITIES,
};
pub use forwarder::{parse_fw, write_fw, FW_PREFIX};
pub use line::{next_line, peek_byte};
pub use secure::{
    parse_challenge, secure_login_response, write_secure_response, PasswordSource,
    ResponseHasher, CHALLENGE_PREFIX,
};
pub use session::{read_handshake, HandshakeData, HandshakeState, Role, Session};

/// First byte of every forwarding command (`FC`, `FF`, `FQ`, ...)
pub const COMMAND_MARKER: u8 = b'F';

/// Last character of a prompt line
pub const PROMPT: u8 = b'>';
