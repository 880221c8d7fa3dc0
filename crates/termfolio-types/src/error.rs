//! Error types for termfolio.

use std::io;

/// Errors produced by the termfolio interpreter and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    #[error("command error: {0}")]
    Command(String),

    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Alias '{0}' is already registered")]
    DuplicateAlias(String),

    #[error("invalid command definition: {0}")]
    InvalidCommand(String),

    #[error("VFS error: {0}")]
    Vfs(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TermError>;
