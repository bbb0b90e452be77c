//! Configuration for sheet enumeration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::archive::DEFAULT_MAX_PART_BYTES;

/// Rows emitted per batch by [`crate::table::SheetTable`] unless configured
pub const DEFAULT_BATCH_SIZE: usize = 2048;

/// What to do when a relationships part repeats an `Id`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The last relationship with a given id replaces earlier ones
    #[default]
    LastWins,
    /// Repeated ids make the relationships part a parse error
    Reject,
}

/// Enumerator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumeratorConfig {
    /// Relationship type suffix that marks a worksheet
    pub worksheet_type_suffix: String,
    /// Maximum uncompressed size of a single archive entry
    pub max_part_bytes: u64,
    pub duplicate_relationships: DuplicatePolicy,
    /// Maximum rows per batch when streaming results
    pub batch_size: usize,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            worksheet_type_suffix: "/worksheet".to_string(),
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
            duplicate_relationships: DuplicatePolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl EnumeratorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EnumeratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every enumeration fail or loop
    pub fn validate(&self) -> Result<()> {
        if self.worksheet_type_suffix.is_empty() {
            anyhow::bail!("Configuration error: 'worksheet_type_suffix' must not be empty");
        }
        if self.max_part_bytes == 0 {
            anyhow::bail!("Configuration error: 'max_part_bytes' must be greater than zero");
        }
        if self.batch_size == 0 {
            anyhow::bail!("Configuration error: 'batch_size' must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnumeratorConfig::default();
        assert_eq!(config.worksheet_type_suffix, "/worksheet");
        assert_eq!(config.max_part_bytes, 256 * 1024 * 1024);
        assert_eq!(config.duplicate_relationships, DuplicatePolicy::LastWins);
        assert_eq!(config.batch_size, 2048);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EnumeratorConfig::from_toml(
            r#"
duplicate_relationships = "reject"
batch_size = 10
"#,
        )
        .unwrap();
        assert_eq!(config.duplicate_relationships, DuplicatePolicy::Reject);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.worksheet_type_suffix, "/worksheet");
    }

    #[test]
    fn test_validation() {
        assert!(EnumeratorConfig::from_toml(r#"worksheet_type_suffix = """#).is_err());
        assert!(EnumeratorConfig::from_toml("max_part_bytes = 0").is_err());
        assert!(EnumeratorConfig::from_toml("batch_size = 0").is_err());
        assert!(EnumeratorConfig::from_toml(r#"duplicate_relationships = "first""#).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheetdir.toml");
        fs::write(&path, "max_part_bytes = 4096\n").unwrap();

        let config = EnumeratorConfig::from_file(&path).unwrap();
        assert_eq!(config.max_part_bytes, 4096);
        assert!(EnumeratorConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
