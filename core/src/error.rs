//! Error types for declaring and invoking commands.
//!
//! Declaration-time problems ([`SignatureError`], [`SchemaError`]) abort the
//! registration of one command and are wrapped in a [`DeclarationError`]
//! naming it. Invocation-time problems ([`BindError`]) abort one invocation.

use thiserror::Error;

use crate::signature::ParamKind;
use crate::types::OptionKind;

/// Problems with the shape of a command's parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The signature has no parameters, so no context parameter.
    #[error("signature must declare a context parameter")]
    MissingContext,
    /// A parameter cannot be bound by keyword, or is variadic.
    #[error("parameter `{parameter}` is {kind}, which is not supported")]
    UnsupportedKind { parameter: String, kind: ParamKind },
    /// Two parameters share a name.
    #[error("duplicate parameter `{0}`")]
    DuplicateParameter(String),
}

/// Declaration-time schema errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The parameter list is unusable.
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// A class-based command cannot be instantiated without arguments.
    #[error("class `{class}` cannot be instantiated without arguments: {reason}")]
    ClassInit { class: String, reason: String },
    /// A class-based command has no callback method.
    #[error("class `{class}` does not define a `{method}` method")]
    MissingCallback { class: String, method: String },
    /// Neither annotation nor kind hint determine the option kind.
    #[error("cannot infer option type for parameter `{parameter}`: {reason}")]
    TypeInference { parameter: String, reason: String },
    /// A command or option name breaks the protocol naming rules.
    #[error("invalid name `{name}`: {reason}")]
    NameValidation { name: String, reason: String },
    /// Descriptor fields are inapplicable to the kind or contradict each other.
    #[error("invalid option `{option}`: {reason}")]
    OptionConfig { option: String, reason: String },
    /// A required option follows an optional one.
    #[error("required option `{required}` is declared after optional option `{optional}`")]
    SchemaOrdering { required: String, optional: String },
    /// Two options resolve to the same name.
    #[error("duplicate option name `{0}`")]
    DuplicateOption(String),
    /// More options than the protocol allows.
    #[error("command declares {count} options, the maximum is {max}")]
    TooManyOptions { count: usize, max: usize },
}

impl SchemaError {
    pub(crate) fn option_config(option: &str, reason: impl Into<String>) -> Self {
        Self::OptionConfig {
            option: option.to_string(),
            reason: reason.into(),
        }
    }
}

/// A declaration error, tagged with the command it belongs to.
///
/// # Examples
///
/// ```
/// use slash_schema_core::*;
///
/// let signature = Signature::new().context("ctx").param(Param::new("untyped"));
/// let err = declare_schema("demo", "A demo", &signature).unwrap_err();
/// assert_eq!(err.command, "demo");
/// assert!(matches!(err.source, SchemaError::TypeInference { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot declare command `{command}`: {source}")]
pub struct DeclarationError {
    /// Name of the command being declared.
    pub command: String,
    /// What went wrong.
    pub source: SchemaError,
}

impl DeclarationError {
    /// Tags `source` with `command`.
    pub fn new(command: &str, source: impl Into<SchemaError>) -> Self {
        Self {
            command: command.to_string(),
            source: source.into(),
        }
    }
}

/// Invocation-time binding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A required option was not supplied.
    #[error("missing required option `{0}`")]
    MissingOption(String),
    /// A supplied value does not match the option's kind or constraints.
    #[error("invalid value for {expected} option `{option}`: {reason}")]
    Coercion {
        option: String,
        expected: OptionKind,
        reason: String,
    },
    /// A value was supplied for an option the schema does not declare.
    #[error("unknown option `{0}`")]
    UnknownOption(String),
}
