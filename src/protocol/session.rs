//! Handshake state machine for B2F sessions.
//!
//! Both roles share one routine. The master speaks first (MOTD plus its
//! handshake), then reads the client's. The client reads first and answers
//! with its own handshake, including the secure login response when the
//! master asked for one.

use std::io::{BufRead, BufWriter, Write};

use super::address::Address;
use super::capabilities::{decode_remote_sid, write_sid, Sid, UserAgent};
use super::forwarder::{parse_fw, write_fw};
use super::line::{next_line, peek_byte};
use super::secure::{
    parse_challenge, secure_login_response, write_secure_response, PasswordSource,
    ResponseHasher, CHALLENGE_PREFIX,
};
use super::{COMMAND_MARKER, PROMPT};
use crate::config::Config;
use crate::error::{B2FError, Result};

/// Which side of the link this session is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Speaks first, owns the MOTD, ends its trailer with the prompt
    Master,
    /// Reacts to the master's handshake
    Client,
}

/// Handshake progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// No handshake attempted yet
    Initial,
    /// Handshake completed, remote SID and forwarders are known
    Established,
    /// Handshake aborted with an error
    Failed,
}

/// What the remote sent during its part of the handshake
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeData {
    /// Remote SID, if a SID line was seen
    pub sid: Option<Sid>,
    /// Remote forwarder addresses
    pub fw: Vec<Address>,
    /// Secure login challenge, if one was sent
    pub secure_challenge: Option<String>,
}

/// A B2F session between this station and one remote
pub struct Session {
    role: Role,
    state: HandshakeState,
    mycall: String,
    targetcall: String,
    locator: String,
    ua: UserAgent,
    local_fw: Vec<Address>,
    motd: Vec<String>,
    gzip_experiment: bool,
    password_source: Option<Box<dyn PasswordSource>>,
    response_hasher: Option<Box<dyn ResponseHasher>>,
    remote_sid: Option<Sid>,
    remote_fw: Vec<Address>,
}

impl Session {
    /// Create a session. The local forwarder list starts as just `mycall`.
    pub fn new(role: Role, mycall: &str, targetcall: &str, locator: &str) -> Self {
        Self {
            role,
            state: HandshakeState::Initial,
            mycall: mycall.to_string(),
            targetcall: targetcall.to_string(),
            locator: locator.to_string(),
            ua: UserAgent::default(),
            local_fw: vec![Address::new(mycall)],
            motd: Vec::new(),
            gzip_experiment: false,
            password_source: None,
            response_hasher: None,
            remote_sid: None,
            remote_fw: Vec::new(),
        }
    }

    /// Create a session from loaded configuration
    pub fn from_config(role: Role, targetcall: &str, config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self::new(
            role,
            &config.station.mycall,
            targetcall,
            &config.station.locator,
        )
        .with_user_agent(config.user_agent())
        .with_motd(config.handshake.motd.clone())
        .with_gzip_experiment(config.gzip_experiment()))
    }

    /// Set the application name and version for the SID line
    pub fn with_user_agent(mut self, ua: UserAgent) -> Self {
        self.ua = ua;
        self
    }

    /// Request messages on behalf of these addresses. The first is primary.
    pub fn with_forwarders(mut self, addrs: Vec<Address>) -> Self {
        self.local_fw = addrs;
        self
    }

    /// Set the message-of-the-day lines (sent only as master)
    pub fn with_motd(mut self, motd: Vec<String>) -> Self {
        self.motd = motd;
        self
    }

    /// Announce the experimental gzip SID code
    pub fn with_gzip_experiment(mut self, enabled: bool) -> Self {
        self.gzip_experiment = enabled;
        self
    }

    /// Register the password source used for secure login
    pub fn with_password_source(mut self, source: impl PasswordSource + 'static) -> Self {
        self.password_source = Some(Box::new(source));
        self
    }

    /// Register the secure login response hasher
    pub fn with_response_hasher(mut self, hasher: impl ResponseHasher + 'static) -> Self {
        self.response_hasher = Some(Box::new(hasher));
        self
    }

    /// Session role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Current handshake state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Check if the handshake completed
    pub fn is_established(&self) -> bool {
        self.state == HandshakeState::Established
    }

    /// Remote SID (after handshake)
    pub fn remote_sid(&self) -> Option<&Sid> {
        self.remote_sid.as_ref()
    }

    /// Remote forwarder addresses (after handshake)
    pub fn remote_forwarders(&self) -> &[Address] {
        &self.remote_fw
    }

    /// Run the handshake over `rd`/`wr`.
    ///
    /// A session runs at most one handshake. On error the session is left
    /// [`HandshakeState::Failed`] and the caller should drop the link.
    pub fn handshake<R: BufRead, W: Write>(&mut self, rd: &mut R, wr: &mut W) -> Result<()> {
        if self.state != HandshakeState::Initial {
            return Err(B2FError::Protocol(format!(
                "Cannot start handshake in state {:?}",
                self.state
            )));
        }

        let result = match self.role {
            Role::Master => self.master_handshake(rd, wr),
            Role::Client => self.client_handshake(rd, wr),
        };

        match &result {
            Ok(()) => {
                self.state = HandshakeState::Established;
                tracing::info!(
                    "Handshake with {} complete, remote SID {}",
                    self.targetcall,
                    self.remote_sid.as_ref().map_or("", Sid::as_str)
                );
            },
            Err(e) => {
                self.state = HandshakeState::Failed;
                tracing::debug!("Handshake with {} failed: {e}", self.targetcall);
            },
        }

        result
    }

    fn master_handshake<R: BufRead, W: Write>(&mut self, rd: &mut R, wr: &mut W) -> Result<()> {
        for line in &self.motd {
            write!(wr, "{line}\r")?;
        }
        self.send_handshake(wr, None)?;

        let hs = read_handshake(rd)?;
        // The master has already sent its handshake, so the response (if any)
        // goes nowhere at this stage.
        self.accept_remote(hs)?;
        Ok(())
    }

    fn client_handshake<R: BufRead, W: Write>(&mut self, rd: &mut R, wr: &mut W) -> Result<()> {
        let hs = read_handshake(rd)?;
        let secure_resp = self.accept_remote(hs)?;
        self.send_handshake(wr, secure_resp.as_deref())
    }

    /// Answer any challenge, then store the remote's SID and forwarders.
    ///
    /// Remote state is only written once the secure login step succeeded.
    fn accept_remote(&mut self, hs: HandshakeData) -> Result<Option<String>> {
        let sid = hs.sid.ok_or(B2FError::NoSid)?;

        let secure_resp = match hs.secure_challenge {
            Some(challenge) => Some(self.answer_challenge(&challenge)?),
            None => None,
        };

        self.remote_sid = Some(sid);
        self.remote_fw = hs.fw;

        Ok(secure_resp)
    }

    fn answer_challenge(&mut self, challenge: &str) -> Result<String> {
        tracing::debug!("Answering secure login challenge from {}", self.targetcall);
        let source = self
            .password_source
            .as_mut()
            .ok_or(B2FError::MissingPasswordSource)?;
        let hasher = self
            .response_hasher
            .as_ref()
            .ok_or(B2FError::MissingResponseHasher)?;

        secure_login_response(challenge, &mut **source, &**hasher)
    }

    /// Write the local handshake: forwarders, SID, response, trailer.
    fn send_handshake<W: Write>(&self, wr: &mut W, secure_resp: Option<&str>) -> Result<()> {
        let mut w = BufWriter::new(wr);

        write_fw(&mut w, &self.local_fw, secure_resp)?;
        write_sid(&mut w, &self.ua, self.gzip_experiment)?;

        if let Some(resp) = secure_resp.filter(|r| !r.is_empty()) {
            write_secure_response(&mut w, resp)?;
        }

        write!(w, "; {} DE {} ({})", self.targetcall, self.mycall, self.locator)?;
        if self.role == Role::Master {
            write!(w, "{}", char::from(PROMPT))?;
        }
        w.write_all(b"\r")?;

        w.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("state", &self.state)
            .field("mycall", &self.mycall)
            .field("targetcall", &self.targetcall)
            .field("locator", &self.locator)
            .field("remote_sid", &self.remote_sid)
            .field("remote_fw", &self.remote_fw)
            .finish_non_exhaustive()
    }
}

/// Read the remote's handshake lines.
///
/// Stops when the next line starts with a protocol command (`F`) or after a
/// prompt line (ending in `>`). Unknown lines are skipped, and so are `***`
/// banners, which some stations send as plain statistics.
pub fn read_handshake<R: BufRead>(rd: &mut R) -> Result<HandshakeData> {
    let mut data = HandshakeData::default();

    loop {
        if peek_byte(rd)? == COMMAND_MARKER {
            // Next line is a protocol command, handshake is done
            return Ok(data);
        }

        let line = next_line(rd, false)?;

        if line.contains('[') {
            data.sid = Some(decode_remote_sid(&line)?);
        } else if line.starts_with(";FW") {
            data.fw = parse_fw(&line)?;
        } else if line.starts_with(CHALLENGE_PREFIX) {
            // An empty challenge means no secure login
            let challenge = parse_challenge(&line);
            if !challenge.is_empty() {
                data.secure_challenge = Some(challenge);
            }
        } else if line.ends_with(char::from(PROMPT)) {
            return Ok(data);
        } else if line.starts_with('*') {
            tracing::warn!("Ignoring remote banner: {line}");
        }
    }
}
