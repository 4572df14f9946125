use serde::{Deserialize, Serialize};

use crate::CommandSchema;

/// Serializable bundle of command schemas.
///
/// A package hands every finished schema to a registration layer in one
/// piece, together with version metadata and an optional content hash that
/// lets the caller skip re-registering an unchanged command set.
///
/// # Examples
///
/// ```
/// use slash_schema_core::*;
///
/// let mut package = SchemaPackage::new("1.0.0", "2024-01-15T10:30:00Z");
/// package.schemas.push(CommandSchema::new("ping", "Check latency"));
/// package.schemas.push(CommandSchema::new("roll", "Roll dice"));
///
/// assert_eq!(package.schema_count(), 2);
/// assert_eq!(package.command_names(), vec!["ping", "roll"]);
/// assert!(package.find("roll").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaPackage {
    /// Schema contract version (populated from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Package version (semver string).
    pub version: String,
    /// Optional package name.
    pub name: Option<String>,
    /// ISO-8601 timestamp for package creation.
    pub generated_at: String,
    /// Hash of the serialized schemas, if computed.
    pub bundle_hash: Option<String>,
    /// Command schemas, in registration order.
    pub schemas: Vec<CommandSchema>,
}

impl SchemaPackage {
    /// Creates an empty package.
    pub fn new(version: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::SCHEMA_CONTRACT_VERSION.to_string()),
            version: version.into(),
            name: None,
            generated_at: generated_at.into(),
            bundle_hash: None,
            schemas: Vec::new(),
        }
    }

    /// Returns the number of schemas in this package.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Finds a schema by command name.
    pub fn find(&self, command: &str) -> Option<&CommandSchema> {
        self.schemas.iter().find(|s| s.name == command)
    }

    /// Gets all command names, in package order.
    pub fn command_names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name.as_str()).collect()
    }
}
