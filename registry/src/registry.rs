//! The startup command registry.
//!
//! Commands are collected with [`RegistryBuilder`] while the application
//! starts. [`build`](RegistryBuilder::build) applies the
//! [`RegistryConfig`], rejects duplicate names and freezes the set. The
//! resulting [`CommandRegistry`] is read-only and safe to share across
//! threads; it dispatches invocations by name and exports every schema as a
//! [`SchemaPackage`] for registration with the host.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use slash_schema_command::SlashCommand;
//! use slash_schema_core::{Param, Signature};
//! use slash_schema_registry::CommandRegistry;
//!
//! let ping = SlashCommand::function(
//!     "ping",
//!     Signature::new().context("ctx").with_doc("Check latency"),
//!     |_: &(), _| "pong".to_string(),
//! )
//! .unwrap();
//!
//! let registry = CommandRegistry::builder().command(ping).build().unwrap();
//! let raw = json!({});
//! assert_eq!(registry.dispatch("ping", &(), raw.as_object().unwrap()).unwrap(), "pong");
//! assert_eq!(registry.package().unwrap().command_names(), vec!["ping"]);
//! ```

use std::collections::HashMap;
use std::io::BufWriter;
use std::path::Path;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use slash_schema_command::SlashCommand;
use slash_schema_core::{CommandSchema, DeclarationError, SchemaPackage};
use tracing::{debug, info};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

/// Read-only set of declared commands, indexed by name.
#[derive(Debug)]
pub struct CommandRegistry<C, R = ()> {
    commands: Vec<SlashCommand<C, R>>,
    index: HashMap<String, usize>,
    config: RegistryConfig,
}

impl<C, R> CommandRegistry<C, R> {
    /// Returns a new [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder<C, R> {
        RegistryBuilder::new()
    }

    /// Looks up a command by name.
    pub fn get(&self, name: &str) -> Option<&SlashCommand<C, R>> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    /// Returns `true` if a command named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates over command names in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name())
    }

    /// Every schema, in registration order.
    pub fn schemas(&self) -> Vec<&CommandSchema> {
        self.commands.iter().map(|c| c.schema()).collect()
    }

    /// The configuration the registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Binds `raw` for the named command and runs it.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownCommand`] when no such command is registered,
    /// or [`RegistryError::Invoke`] when the invocation fails.
    pub fn dispatch(&self, name: &str, ctx: &C, raw: &Map<String, Value>) -> Result<R> {
        let command = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownCommand(name.to_string()))?;

        debug!(command = %name, options = raw.len(), "Dispatching command");

        command.invoke(ctx, raw).map_err(|source| RegistryError::Invoke {
            command: name.to_string(),
            source,
        })
    }

    /// Packages every schema for registration.
    ///
    /// The bundle hash is the SHA-256 of the serialized schema list, so it
    /// only changes when a schema does.
    ///
    /// # Errors
    ///
    /// [`RegistryError::JsonError`] if the schemas cannot be serialized.
    pub fn package(&self) -> Result<SchemaPackage> {
        let mut package = SchemaPackage::new(
            self.config.package_version.clone(),
            chrono::Utc::now().to_rfc3339(),
        );
        package.name = self.config.package_name.clone();
        package.schemas = self.commands.iter().map(|c| c.schema().clone()).collect();

        let bytes = serde_json::to_vec(&package.schemas)?;
        package.bundle_hash = Some(format!("{:x}", Sha256::digest(&bytes)));

        Ok(package)
    }

    /// Writes [`package`](Self::package) to `path` as JSON.
    ///
    /// # Errors
    ///
    /// [`RegistryError::IoError`] if the file cannot be written, or
    /// [`RegistryError::JsonError`] if serialization fails.
    pub fn write_package(&self, path: impl AsRef<Path>) -> Result<SchemaPackage> {
        let package = self.package()?;
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &package)?;
        Ok(package)
    }
}

/// Collects commands before the registry is frozen.
#[derive(Debug)]
pub struct RegistryBuilder<C, R = ()> {
    commands: Vec<SlashCommand<C, R>>,
    config: RegistryConfig,
}

impl<C, R> RegistryBuilder<C, R> {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            config: RegistryConfig::default(),
        }
    }

    /// Sets the configuration applied at [`build`](Self::build).
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a declared command.
    pub fn command(mut self, command: SlashCommand<C, R>) -> Self {
        self.commands.push(command);
        self
    }

    /// Adds the outcome of declaring a command.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Declaration`] when the declaration failed.
    pub fn try_command(
        self,
        declared: std::result::Result<SlashCommand<C, R>, DeclarationError>,
    ) -> Result<Self> {
        Ok(self.command(declared?))
    }

    /// Adds every command in `commands`.
    pub fn commands(mut self, commands: impl IntoIterator<Item = SlashCommand<C, R>>) -> Self {
        self.commands.extend(commands);
        self
    }

    /// Freezes the registry.
    ///
    /// The configured unknown-option policy is applied to every command
    /// that did not set its own.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateCommand`] when two commands share a name.
    pub fn build(self) -> Result<CommandRegistry<C, R>> {
        let policy = self.config.unknown_options;
        let mut index = HashMap::with_capacity(self.commands.len());
        let mut commands = Vec::with_capacity(self.commands.len());

        for command in self.commands {
            let command = command.with_default_unknown_options(policy);
            if index.insert(command.name().to_string(), commands.len()).is_some() {
                return Err(RegistryError::DuplicateCommand(command.name().to_string()));
            }
            commands.push(command);
        }

        info!(
            commands = commands.len(),
            unknown_options = ?policy,
            "Built command registry"
        );

        Ok(CommandRegistry {
            commands,
            index,
            config: self.config,
        })
    }
}

impl<C, R> Default for RegistryBuilder<C, R> {
    fn default() -> Self {
        Self::new()
    }
}
