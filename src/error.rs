use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Unsupported config file type for {path} (expected .toml, .json, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Cannot bind environment variable: {0}")]
    BindError(String),

    #[error("Required configuration key '{0}' is not set")]
    MissingKey(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    /// True for the failures `load_from_file` can produce.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ConfigError::IoError { .. }
                | ConfigError::ParseError { .. }
                | ConfigError::UnsupportedFormat { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_path_and_cause() {
        let err = ConfigError::ParseError {
            path: "/etc/myapp/config.json".into(),
            reason: "expected value at line 1 column 1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("config.json"));
        assert!(msg.contains("line 1 column 1"));
    }

    #[test]
    fn missing_key_formats() {
        let err = ConfigError::MissingKey("database.url".into());
        assert!(err.to_string().contains("database.url"));
    }

    #[test]
    fn load_errors_are_grouped() {
        let io = ConfigError::IoError {
            path: "x.toml".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(io.is_load_error());
        assert!(ConfigError::UnsupportedFormat { path: "x.ini".into() }.is_load_error());
        assert!(!ConfigError::BindError("empty key".into()).is_load_error());
        assert!(!ConfigError::MissingKey("a".into()).is_load_error());
    }
}
