//! Error types for registry operations.
//!
//! Covers configuration and package file I/O, serialization, registration
//! conflicts, and failures surfaced from declaring or invoking commands.

use slash_schema_command::InvokeError;
use slash_schema_core::DeclarationError;
use thiserror::Error;

/// Errors that can occur while building or using a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Two commands were registered under the same name.
    #[error("command `{0}` is registered more than once")]
    DuplicateCommand(String),

    /// Dispatch named a command that is not registered.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    /// A command failed to declare.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    /// A dispatched invocation failed.
    #[error("command `{command}` failed: {source}")]
    Invoke {
        command: String,
        source: InvokeError,
    },
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
