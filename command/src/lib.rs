//! Function and class-based slash commands.
//!
//! [`SlashCommand`] is the registrable unit: it runs the declaration pipeline
//! from `slash-schema-core` once, keeps the resulting schema, and binds and
//! dispatches each invocation.
//!
//! Commands come in two shapes:
//!
//! - **Function commands** take a context and [`BoundArguments`]; options are
//!   described by a [`Signature`].
//! - **Class commands** are described by a [`ClassDefinition`]. Option
//!   attributes become options in declaration order and every invocation
//!   works on a fresh instance.
//!
//! [`BoundArguments`]: slash_schema_core::BoundArguments
//! [`Signature`]: slash_schema_core::Signature

mod class;
mod command;
mod error;

pub use class::{transform, ClassAdapter, ClassDefinition, CALLBACK_METHOD};
pub use command::{CommandSource, SlashCommand};
pub use error::InvokeError;
