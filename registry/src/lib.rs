//! Startup registry, dispatch and schema export for slash commands.
//!
//! This crate holds the application-facing end of the pipeline: commands
//! declared with `slash-schema-command` are collected into a
//! [`CommandRegistry`], frozen at startup, looked up and dispatched by name,
//! and exported as a [`SchemaPackage`](slash_schema_core::SchemaPackage) for
//! the host's registration call.
//!
//! # Quick start
//!
//! ```no_run
//! use slash_schema_command::SlashCommand;
//! use slash_schema_core::{Param, Signature};
//! use slash_schema_registry::{CommandRegistry, RegistryConfig};
//!
//! let config = RegistryConfig::load("registry.yml").unwrap();
//!
//! let say = SlashCommand::function(
//!     "say",
//!     Signature::new().context("ctx").param(Param::typed::<String>("text")),
//!     |_: &(), args| println!("{}", args.get::<String>("text").unwrap_or_default()),
//! )
//! .unwrap();
//!
//! let registry = CommandRegistry::builder()
//!     .config(config)
//!     .command(say)
//!     .build()
//!     .unwrap();
//!
//! registry.write_package("commands.json").unwrap();
//! ```

mod config;
mod error;
mod registry;

pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use registry::{CommandRegistry, RegistryBuilder};
