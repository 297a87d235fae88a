use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use twitch_live::TranscoderConfig;

use crate::error::{CliError, Result};

/// User settings read from `config.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where recordings are written.
    pub output_dir: PathBuf,
    /// ffmpeg program name or path.
    pub ffmpeg_path: String,
    /// Container extension of recordings.
    pub container: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Preferred height when `--quality` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let transcoder = TranscoderConfig::default();
        Self {
            output_dir: default_output_dir(),
            ffmpeg_path: transcoder.program,
            container: transcoder.container,
            timeout_secs: 30,
            quality: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .map(|dir| dir.join("twsave"))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("twsave").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => {
                    debug!("No configuration file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&raw)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.show()?)?;
        Ok(())
    }

    /// Write defaults to `path` (or the default location) and return where.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path().ok_or_else(|| {
                CliError::Config("cannot determine the configuration directory".to_string())
            })?,
        };
        Self::default().save(&path)?;
        Ok(path)
    }

    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn transcoder(&self) -> TranscoderConfig {
        TranscoderConfig {
            program: self.ffmpeg_path.clone(),
            container: self.container.clone(),
            ..TranscoderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
            quality = 720
            "#,
        )
        .unwrap();

        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.quality, Some(720));
        assert_eq!(config.container, "mp4");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.transcoder().program, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.transcoder().log_level, "warning");
    }

    #[test]
    fn test_reset_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let written = AppConfig::reset(Some(&path)).unwrap();
        assert_eq!(written, path);

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&path)).unwrap_err(),
            CliError::TomlDe(_)
        ));
    }
}
