//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{B2FError, Result};
use crate::protocol::UserAgent;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local station identity
    #[serde(default)]
    pub station: StationConfig,

    /// Application name and version announced in the SID line.
    /// Unset means the crate's own name and version.
    #[serde(default)]
    pub agent: Option<UserAgent>,

    /// Handshake behaviour
    #[serde(default)]
    pub handshake: HandshakeConfig,
}

impl Config {
    /// Default config file location (`<config dir>/b2f/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("b2f").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| B2FError::Config(format!("Failed to read config file: {e}")))?;

        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(mycall) = std::env::var("B2F_MYCALL") {
            config.station.mycall = mycall;
        }
        if let Ok(locator) = std::env::var("B2F_LOCATOR") {
            config.station.locator = locator;
        }
        if let Ok(name) = std::env::var("B2F_AGENT_NAME") {
            config.agent.get_or_insert_with(UserAgent::default).name = name;
        }
        if let Ok(version) = std::env::var("B2F_AGENT_VERSION") {
            config.agent.get_or_insert_with(UserAgent::default).version = version;
        }
        if let Ok(val) = std::env::var("GZIP_EXPERIMENT") {
            config.handshake.gzip_experiment = Some(val == "1");
        }

        config
    }

    /// Merge with another config (other takes precedence where it is set)
    pub fn merge(self, other: Self) -> Self {
        Self {
            station: StationConfig {
                mycall: if other.station.mycall.is_empty() {
                    self.station.mycall
                } else {
                    other.station.mycall
                },
                locator: if other.station.locator.is_empty() {
                    self.station.locator
                } else {
                    other.station.locator
                },
            },
            agent: other.agent.or(self.agent),
            handshake: HandshakeConfig {
                gzip_experiment: other
                    .handshake
                    .gzip_experiment
                    .or(self.handshake.gzip_experiment),
                motd: if other.handshake.motd.is_empty() {
                    self.handshake.motd
                } else {
                    other.handshake.motd
                },
            },
        }
    }

    /// Announced user agent, falling back to the crate's own
    pub fn user_agent(&self) -> UserAgent {
        self.agent.clone().unwrap_or_default()
    }

    /// Whether the experimental gzip code is announced
    pub fn gzip_experiment(&self) -> bool {
        self.handshake.gzip_experiment.unwrap_or(false)
    }

    /// Check that the station identity is filled in
    pub fn validate(&self) -> Result<()> {
        if self.station.mycall.is_empty() {
            return Err(B2FError::Config("station.mycall is not set".to_string()));
        }
        if self.station.mycall.contains(' ') {
            return Err(B2FError::Config(format!(
                "station.mycall {:?} contains a space",
                self.station.mycall
            )));
        }
        Ok(())
    }
}

/// Local station identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationConfig {
    /// Own callsign
    #[serde(default)]
    pub mycall: String,

    /// Maidenhead grid locator (e.g. `JO59`)
    #[serde(default)]
    pub locator: String,
}

/// Handshake configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandshakeConfig {
    /// Announce the experimental gzip (`G`) SID code. Unset means off.
    #[serde(default)]
    pub gzip_experiment: Option<bool>,

    /// Message-of-the-day lines sent by the master before its handshake
    #[serde(default)]
    pub motd: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.station.mycall.is_empty());
        assert_eq!(config.user_agent().name, "b2f");
        assert!(!config.gzip_experiment());
        assert!(config.handshake.motd.is_empty());
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [station]
            mycall = "N0CALL"
            locator = "JO59"

            [agent]
            name = "PATApp"
            version = "1.0"

            [handshake]
            gzip_experiment = true
            motd = ["Welcome", "Be nice"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.station.mycall, "N0CALL");
        assert_eq!(config.station.locator, "JO59");
        assert_eq!(config.user_agent().name, "PATApp");
        assert!(config.gzip_experiment());
        assert_eq!(config.handshake.motd.len(), 2);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[station]\nmycall = \"LA5NTA\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.station.mycall, "LA5NTA");
        assert!(config.station.locator.is_empty());
    }

    #[test]
    fn test_config_from_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[station\nmycall = ").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, B2FError::Config(_)));
    }

    #[test]
    fn test_merge_prefers_set_values() {
        let base = Config {
            station: StationConfig {
                mycall: "N0CALL".into(),
                locator: "JO59".into(),
            },
            ..Default::default()
        };
        let overlay = Config {
            station: StationConfig {
                mycall: String::new(),
                locator: "JP20".into(),
            },
            agent: Some(UserAgent::new("PATApp", "1.0")),
            ..Default::default()
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.station.mycall, "N0CALL");
        assert_eq!(merged.station.locator, "JP20");
        assert_eq!(merged.user_agent().name, "PATApp");
    }

    #[test]
    fn test_merge_overlay_can_disable_gzip() {
        let base = Config {
            handshake: HandshakeConfig {
                gzip_experiment: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let overlay = Config {
            handshake: HandshakeConfig {
                gzip_experiment: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(!base.clone().merge(overlay).gzip_experiment());
        // Unset in the overlay keeps the base value.
        assert!(base.merge(Config::default()).gzip_experiment());
    }

    #[test]
    fn test_merge_overlay_agent_equal_to_default_wins() {
        let base = Config {
            agent: Some(UserAgent::new("PATApp", "1.0")),
            ..Default::default()
        };
        let overlay = Config {
            agent: Some(UserAgent::default()),
            ..Default::default()
        };

        assert_eq!(base.merge(overlay).user_agent(), UserAgent::default());
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_err());

        let mut config = Config::default();
        config.station.mycall = "N0CALL".into();
        assert!(config.validate().is_ok());
    }
}
