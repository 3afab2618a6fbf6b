//! Validation helpers shared across configuration loading and `validator::Validate` impls.

use std::path::Path;

use validator::ValidationError;

/// A `validator::Validate` field-level check: the given path must exist on disk.
pub fn validate_path_exists(path: &Path) -> Result<(), ValidationError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ValidationError::new("Path does not exist"))
    }
}

/// Wraps `validator::ValidationErrors`, giving `ConfigError::ConfigValidationError` a
/// `std::error::Error` source that prints all nested field errors on one line.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ParsedValidationErrors(#[from] validator::ValidationErrors);

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::validate_path_exists;

    #[test]
    fn existing_path_passes() {
        assert!(validate_path_exists(Path::new(".")).is_ok());
    }

    #[test]
    fn missing_path_fails() {
        assert!(validate_path_exists(Path::new("/definitely/not/a/real/path/xyz")).is_err());
    }
}
