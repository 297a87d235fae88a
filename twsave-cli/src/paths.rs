use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CliError, Result};

/// Make sure `path` is a writable directory and return it as an absolute path.
///
/// A missing directory is created.
pub fn validate_output_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        debug!(path = %path.display(), "Creating output directory");
        std::fs::create_dir_all(path)
            .map_err(|e| CliError::invalid_output_dir(path, e.to_string()))?;
    }

    let absolute = path
        .canonicalize()
        .map_err(|e| CliError::invalid_output_dir(path, e.to_string()))?;

    if !absolute.is_dir() {
        return Err(CliError::invalid_output_dir(absolute, "not a directory"));
    }

    tempfile::tempfile_in(&absolute)
        .map_err(|e| CliError::invalid_output_dir(&absolute, format!("not writable: {e}")))?;

    Ok(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let validated = validate_output_dir(dir.path()).unwrap();
        assert!(validated.is_absolute());
        assert_eq!(validated, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b");
        let validated = validate_output_dir(&target).unwrap();
        assert!(validated.is_dir());
    }

    #[test]
    fn test_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("recording.mp4");
        std::fs::write(&file, b"").unwrap();

        let err = validate_output_dir(&file).unwrap_err();
        assert!(matches!(err, CliError::InvalidOutputDir { .. }));
    }
}
