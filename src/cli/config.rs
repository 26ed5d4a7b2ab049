//! Engine configuration
//!
//! Optional JSON file; every field has a default, so `{}` is a valid
//! configuration and so is no file at all.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{DEFAULT_DATA_SUBDIR, DEFAULT_SCHEMA_FILE};
use crate::observability::Severity;

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Schema file name inside the database directory
    #[serde(default = "default_schema_file")]
    pub schema_file: String,

    /// Directory inside the database directory holding `<table>.csv`
    #[serde(default = "default_data_subdir")]
    pub data_subdir: String,

    /// Lowest log severity written to stderr
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_file() -> String {
    DEFAULT_SCHEMA_FILE.to_string()
}
fn default_data_subdir() -> String {
    DEFAULT_DATA_SUBDIR.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_file: default_schema_file(),
            data_subdir: default_data_subdir(),
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.schema_file.trim().is_empty() {
            return Err(CliError::config_error("schema_file must not be empty"));
        }
        if self.data_subdir.trim().is_empty() {
            return Err(CliError::config_error("data_subdir must not be empty"));
        }
        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error, fatal.",
                self.log_level
            ))
        })
    }
}
