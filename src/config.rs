//! Configuration file
//!
//! ```json
//! {
//!   "source_path": "data/us_postal_codes.csv",
//!   "store_path": "data/zip.dat",
//!   "index_path": "data/zip.idx",
//!   "header_layout": "schema",
//!   "log_level": "info"
//! }
//! ```
//!
//! Every field is optional; command line flags override file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;
use crate::store::{HeaderLayout, SchemaLayout};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which header layout new stores are written with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Version 1: count and creation date only
    Minimal,
    /// Version 2: adds index file name and field schema
    Schema,
}

/// Paths and settings for one store/index pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Delimited source dataset; needed to rebuild a missing store
    #[serde(default)]
    pub source_path: Option<PathBuf>,

    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    #[serde(default = "default_header_layout")]
    pub header_layout: LayoutKind,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("zip.dat")
}
fn default_index_path() -> PathBuf {
    PathBuf::from("zip.idx")
}
fn default_header_layout() -> LayoutKind {
    LayoutKind::Schema
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: None,
            store_path: default_store_path(),
            index_path: default_index_path(),
            header_layout: default_header_layout(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with explicit store and index paths
    pub fn with_paths(store_path: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            index_path: index_path.into(),
            ..Self::default()
        }
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store_path must not be empty".into()));
        }
        if self.index_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("index_path must not be empty".into()));
        }
        if self.store_path == self.index_path {
            return Err(ConfigError::Invalid(
                "store_path and index_path must differ".into(),
            ));
        }
        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Invalid log_level: '{}'",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Minimum log severity
    pub fn log_severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }

    /// Header layout for newly written stores.
    ///
    /// The schema layout records the index file name, not its full path.
    pub fn header_layout(&self) -> HeaderLayout {
        match self.header_layout {
            LayoutKind::Minimal => HeaderLayout::Minimal,
            LayoutKind::Schema => {
                let index_name = self
                    .index_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                HeaderLayout::Schema(SchemaLayout::zip_codes(index_name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.header_layout, LayoutKind::Schema);
        assert_eq!(config.log_severity(), Severity::Info);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_json(
            r#"{
                "source_path": "data/zips.csv",
                "store_path": "data/zip.dat",
                "index_path": "data/zip.idx",
                "header_layout": "minimal",
                "log_level": "warn"
            }"#,
        )
        .unwrap();

        assert_eq!(config.source_path, Some(PathBuf::from("data/zips.csv")));
        assert_eq!(config.header_layout(), HeaderLayout::Minimal);
        assert_eq!(config.log_severity(), Severity::Warn);
    }

    #[test]
    fn test_schema_layout_records_index_file_name() {
        let config = Config::with_paths("data/zip.dat", "data/zip.idx");
        match config.header_layout() {
            HeaderLayout::Schema(schema) => assert_eq!(schema.index_file_name, "zip.idx"),
            other => panic!("unexpected layout {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_layout() {
        let err = Config::from_json(r#"{"header_layout": "fancy"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let err = Config::from_json(r#"{"log_level": "loud"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_same_store_and_index() {
        let err = Config::from_json(r#"{"store_path": "x", "index_path": "x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
