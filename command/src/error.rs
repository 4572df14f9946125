//! Invocation-time errors.

use slash_schema_core::BindError;
use thiserror::Error;

/// Errors that abort a single command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// The supplied option values could not be bound.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// A class-based command could not create its per-invocation instance.
    #[error("cannot instantiate `{class}`: {reason}")]
    ClassInit { class: String, reason: String },
}
