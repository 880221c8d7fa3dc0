//! Terminal configuration.
//!
//! Every field has a default, so an empty or partial TOML file is valid.
//!
//! ```toml
//! history_limit = 50
//!
//! [prompt]
//! user = "visitor"
//!
//! [limits]
//! max_args = 20
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TermError};

/// Top-level terminal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub prompt: PromptConfig,
    pub limits: ParserLimits,
    pub animation: AnimationConfig,
    /// Maximum number of history entries kept per session.
    pub history_limit: usize,
    /// Home directory that `~` expands to.
    pub home: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: PromptConfig::default(),
            limits: ParserLimits::default(),
            animation: AnimationConfig::default(),
            history_limit: 100,
            home: "/home/guest".to_string(),
        }
    }
}

impl TerminalConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no session can run with.
    pub fn validate(&self) -> Result<()> {
        if !self.home.starts_with('/') {
            return Err(TermError::Config(format!(
                "home must be an absolute path, got '{}'",
                self.home
            )));
        }
        if self.limits.max_input_length == 0 {
            return Err(TermError::Config("limits.max_input_length must be at least 1".into()));
        }
        Ok(())
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Prompt appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub user: String,
    pub host: String,
    pub symbol: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            user: "guest".to_string(),
            host: "termfolio".to_string(),
            symbol: "$".to_string(),
        }
    }
}

/// Input size limits enforced by the argument parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserLimits {
    /// Longest accepted input line, in characters.
    pub max_input_length: usize,
    /// Most positional arguments per command.
    pub max_args: usize,
    /// Longest single token; longer tokens are dropped.
    pub max_token_length: usize,
    /// Most distinct flag and option keys per command.
    pub max_options: usize,
    /// Longest `--key=value` key.
    pub max_option_key_length: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_input_length: 10_000,
            max_args: 100,
            max_token_length: 1_000,
            max_options: 50,
            max_option_key_length: 100,
        }
    }
}

/// Defaults for animated commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub default_fps: u32,
    /// Lower bound on the delay between two frames.
    pub min_frame_delay_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_fps: 30,
            min_frame_delay_ms: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let cfg = TerminalConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, TerminalConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_fields() {
        let cfg = TerminalConfig::from_toml_str(
            "history_limit = 5\n[prompt]\nuser = \"visitor\"\n[limits]\nmax_args = 3\n",
        )
        .unwrap();
        assert_eq!(cfg.history_limit, 5);
        assert_eq!(cfg.prompt.user, "visitor");
        assert_eq!(cfg.prompt.host, "termfolio");
        assert_eq!(cfg.limits.max_args, 3);
        assert_eq!(cfg.limits.max_input_length, 10_000);
    }

    #[test]
    fn malformed_toml_is_error() {
        assert!(TerminalConfig::from_toml_str("history_limit = [").is_err());
    }

    #[test]
    fn relative_home_is_a_config_error() {
        let err = TerminalConfig::from_toml_str("home = \"guest\"\n").unwrap_err();
        assert!(matches!(err, TermError::Config(_)));
        assert_eq!(
            err.to_string(),
            "config error: home must be an absolute path, got 'guest'"
        );
    }

    #[test]
    fn zero_input_length_is_a_config_error() {
        let err = TerminalConfig::from_toml_str("[limits]\nmax_input_length = 0\n").unwrap_err();
        assert!(matches!(err, TermError::Config(_)));
        assert!(TerminalConfig::default().validate().is_ok());
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TerminalConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, TerminalConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("termfolio.toml");
        fs::write(&path, "home = \"/home/ada\"\n").unwrap();
        let cfg = TerminalConfig::load(&path).unwrap();
        assert_eq!(cfg.home, "/home/ada");
    }
}
