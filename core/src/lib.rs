//! Slash command schemas derived from callback signatures.
//!
//! This crate turns a command callback's declared parameters into a
//! validated, protocol-ready [`CommandSchema`], and binds invocation values
//! back onto those parameters:
//!
//! - [`OptionDescriptor`] — explicit per-option metadata (name, description,
//!   kind, requiredness, choices, bounds, autocomplete, channel types).
//! - [`Signature`] / [`Param`] — the callback's parameter list, context
//!   first; [`reflect`] checks it and yields the option parameters.
//! - [`resolve_option`] — merges a parameter's [`Annotation`] and default
//!   with its descriptor into a [`CanonicalOption`].
//! - [`SchemaBuilder`] — certifies the whole command (names, count,
//!   required-before-optional ordering) and emits the schema.
//! - [`Binder`] — coerces raw invocation values into [`BoundArguments`].
//!
//! [`declare_schema`] runs the declaration stages in one call.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use slash_schema_core::*;
//!
//! let signature = Signature::new()
//!     .context("ctx")
//!     .param(Param::typed::<String>("text").with_option(
//!         OptionDescriptor::new("What to echo").with_max_length(200),
//!     ))
//!     .param(Param::typed::<i64>("times").with_default(1));
//!
//! let schema = declare_schema("echo", "Repeat a message", &signature).unwrap();
//! assert_eq!(schema.option_names(), vec!["text", "times"]);
//!
//! let raw = json!({"text": "hello"});
//! let args = Binder::default().bind(&schema, raw.as_object().unwrap()).unwrap();
//! assert_eq!(args.get::<String>("text").unwrap(), "hello");
//! assert_eq!(args.get::<i64>("times").unwrap(), 1);
//! ```

mod annotation;
mod bind;
mod descriptor;
pub mod entity;
mod error;
mod package;
mod pipeline;
mod resolve;
mod signature;
mod types;
mod validate;

pub use annotation::{Annotation, OptionType};
pub use bind::{bind_arguments, coerce, Binder, BoundArguments, FromOptionValue, UnknownOptionPolicy};
pub use descriptor::OptionDescriptor;
pub use error::{BindError, DeclarationError, SchemaError, SignatureError};
pub use package::SchemaPackage;
pub use pipeline::{declare_schema, resolve_options};
pub use resolve::resolve_option;
pub use signature::{reflect, Converter, Param, ParamDefault, ParamKind, ReflectedParameter, Signature};
pub use types::*;
pub use validate::{build_schema, normalize_name, validate_name, validate_schema, SchemaBuilder};
