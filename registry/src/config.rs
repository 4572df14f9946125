//! Registry configuration.
//!
//! Defines the YAML-serializable settings applied to every command when the
//! registry is built, and the metadata stamped on exported schema packages.
//! Every field has a default, so an empty document is a valid configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! unknown_options: reject
//! package_version: "2.3.0"
//! package_name: moderation-bot
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use slash_schema_core::UnknownOptionPolicy;

use crate::error::Result;

/// Top-level registry configuration.
///
/// # Examples
///
/// ```
/// use slash_schema_core::UnknownOptionPolicy;
/// use slash_schema_registry::RegistryConfig;
///
/// let config: RegistryConfig = serde_yaml::from_str("unknown_options: reject").unwrap();
/// assert_eq!(config.unknown_options, UnknownOptionPolicy::Reject);
/// assert_eq!(config.version, "1.0");
/// assert_eq!(config.package_version, "0.1.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Configuration format version.
    pub version: String,
    /// Treatment of option names a command does not declare.
    pub unknown_options: UnknownOptionPolicy,
    /// Version stamped on exported schema packages.
    pub package_version: String,
    /// Name stamped on exported schema packages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            unknown_options: UnknownOptionPolicy::default(),
            package_version: "0.1.0".to_string(),
            package_name: None,
        }
    }
}

impl RegistryConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::RegistryError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
