//! Configuration schema (schemavet.toml)

use serde::{Deserialize, Serialize};

/// Tunable rule boundaries
///
/// Every numeric boundary the checks consult lives here as a named,
/// overridable value. Defaults reproduce the reference behavior of the
/// standard rule set; deployments with very large or very small tables
/// can move them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Row count at which a table stops counting as small
    #[serde(default = "default_medium_table_rows")]
    pub medium_table_rows: u64,

    /// Row count at which a table counts as large
    #[serde(default = "default_large_table_rows")]
    pub large_table_rows: u64,

    /// Distinct-value count at which a column counts as high-cardinality
    #[serde(default = "default_high_cardinality")]
    pub high_cardinality: u64,

    /// Declared string length at which a column counts as long
    #[serde(default = "default_long_string_length")]
    pub long_string_length: u32,
}

fn default_medium_table_rows() -> u64 {
    1_000
}

fn default_large_table_rows() -> u64 {
    100_000
}

fn default_high_cardinality() -> u64 {
    1_000
}

fn default_long_string_length() -> u32 {
    64
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            medium_table_rows: default_medium_table_rows(),
            large_table_rows: default_large_table_rows(),
            high_cardinality: default_high_cardinality(),
            long_string_length: default_long_string_length(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rule boundaries
    #[serde(default)]
    pub thresholds: Thresholds,

    /// `schema.table` glob patterns to exclude from analysis. Matching
    /// happens when a snapshot is loaded; the engine analyzes whatever
    /// snapshot it is handed.
    #[serde(default)]
    pub ignore_tables: Vec<String>,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Whether a `schema.table` name matches any ignore pattern
    pub fn is_table_ignored(&self, fqn: &str) -> bool {
        self.ignore_tables.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, fqn)
            } else {
                pattern == fqn
            }
        })
    }
}

/// Simple glob matching (single `*` wildcard)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.len() >= prefix.len() + suffix.len()
            && text.starts_with(prefix)
            && text.ends_with(suffix)
    } else {
        pattern == text
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
