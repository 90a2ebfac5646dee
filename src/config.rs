// src/config.rs

//! Configuration file parsing
//!
//! A small TOML file; every key is optional:
//!
//! ```toml
//! db_path = "/var/lib/lca-assembly/assembly.db"
//! acting_user_id = 1
//! copy_label = "copy of"
//! include_operation_phase = false
//! ```
//!
//! `LCA_ASSEMBLY_DB` overrides `db_path`.

use crate::copy::DEFAULT_COPY_LABEL;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Config file read when no explicit path is given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/lca-assembly/config.toml";

/// Database location when neither config nor environment name one
pub const DEFAULT_DB_PATH: &str = "/var/lib/lca-assembly/assembly.db";

/// Environment variable overriding the database path
pub const DB_PATH_ENV: &str = "LCA_ASSEMBLY_DB";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Owner of copies made without an explicit owner
    #[serde(default = "default_acting_user_id")]
    pub acting_user_id: i64,

    #[serde(default = "default_copy_label")]
    pub copy_label: String,

    /// Whether operation-phase processes count when resolving conversions
    #[serde(default)]
    pub include_operation_phase: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            acting_user_id: default_acting_user_id(),
            copy_label: default_copy_label(),
            include_operation_phase: false,
        }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_acting_user_id() -> i64 {
    1
}

fn default_copy_label() -> String {
    DEFAULT_COPY_LABEL.to_string()
}

impl Config {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config = Self::parse(&content).map_err(|e| match e {
            Error::ConfigError(msg) => {
                Error::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or the default file when present, or built-in defaults;
    /// then apply the environment override
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };

        if let Ok(db_path) = std::env::var(DB_PATH_ENV)
            && !db_path.is_empty()
        {
            config.db_path = db_path;
        }

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.db_path.trim().is_empty() {
            return Err(Error::ConfigError("db_path must not be empty".to_string()));
        }
        if self.copy_label.trim().is_empty() {
            return Err(Error::ConfigError("copy_label must not be empty".to_string()));
        }
        if self.acting_user_id <= 0 {
            return Err(Error::ConfigError(format!(
                "acting_user_id must be positive, got {}",
                self.acting_user_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_all_keys() {
        let config = Config::parse(
            r#"
            db_path = "/tmp/a.db"
            acting_user_id = 7
            copy_label = "Kopie von"
            include_operation_phase = true
            "#,
        )
        .unwrap();

        assert_eq!(config.db_path, "/tmp/a.db");
        assert_eq!(config.acting_user_id, 7);
        assert_eq!(config.copy_label, "Kopie von");
        assert!(config.include_operation_phase);
    }

    #[test]
    fn test_rejects_unknown_and_invalid_values() {
        assert!(matches!(
            Config::parse("dbpath = \"x\""),
            Err(Error::ConfigError(_))
        ));
        assert!(Config::parse("acting_user_id = 0").is_err());
        assert!(Config::parse("copy_label = \" \"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "acting_user_id = 3").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.acting_user_id, 3);
        assert_eq!(config.copy_label, DEFAULT_COPY_LABEL);

        assert!(Config::load(Path::new("/nonexistent/lca.toml")).is_err());
    }
}
