//! # B2F - Winlink B2 Forwarding handshake
//!
//! Session establishment for the FBB/Winlink "B2 Forwarding" protocol used
//! between radio-email stations.
//!
//! ## Features
//!
//! - **SID codec**: encode and decode `[name-version-codes]` capability lines
//! - **Forwarder lists**: parse and write `;FW:` lines, with inline secure
//!   login hashes for auxiliary addresses
//! - **Secure login**: `;PQ:`/`;PR:` challenge-response with an injected
//!   password source and response hasher
//! - **Handshake**: one state machine for both master and client roles
//!
//! The crate works on any `std::io::BufRead` + `std::io::Write` pair. Opening
//! the link (radio modem, telnet) and the message transfer that follows the
//! handshake belong to the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use b2f::{Role, Session, UserAgent};
//!
//! let mut session = Session::new(Role::Master, "N0CALL", "LA1B", "JO59")
//!     .with_user_agent(UserAgent::new("PATApp", "1.0"))
//!     .with_motd(vec!["Welcome to N0CALL".to_string()]);
//!
//! session.handshake(&mut reader, &mut writer)?;
//! println!("Remote SID: {}", session.remote_sid().unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: SID, forwarder, secure login and the handshake
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod protocol;

// Re-exports for convenience
pub use config::Config;
pub use error::{is_login_failure, B2FError, Result};
pub use protocol::{Address, Capability, HandshakeState, Role, Session, Sid, UserAgent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
