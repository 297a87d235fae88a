use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Cannot serialize config: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid output directory {}: {reason}", .path.display())]
    InvalidOutputDir { path: PathBuf, reason: String },

    #[error(transparent)]
    Resolver(#[from] twitch_live::Error),
}

impl CliError {
    pub fn invalid_output_dir(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidOutputDir {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
