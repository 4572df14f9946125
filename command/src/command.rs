//! Registrable slash commands.
//!
//! A [`SlashCommand`] pairs a validated [`CommandSchema`] with the code that
//! runs it: either a function taking the context and [`BoundArguments`], or
//! a [`ClassAdapter`](crate::ClassAdapter). Construction runs the full
//! declaration pipeline, so a `SlashCommand` that exists is always valid.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use slash_schema_core::{
    build_schema, declare_schema, resolve_options, Binder, BoundArguments, CommandSchema,
    DeclarationError, Signature, UnknownOptionPolicy, DEFAULT_DESCRIPTION,
};
use tracing::debug;

use crate::class::{transform, ClassDefinition};
use crate::error::InvokeError;

type Invoker<C, R> = Arc<dyn Fn(&C, &BoundArguments) -> Result<R, InvokeError> + Send + Sync>;
type ErrorReporter<C> = Arc<dyn Fn(&C, &InvokeError) + Send + Sync>;

/// How a command was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSource {
    /// A plain callback function.
    Function,
    /// A class definition, by class name.
    Class(String),
}

/// A declared command: its schema plus its handler.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use slash_schema_command::SlashCommand;
/// use slash_schema_core::{Param, Signature};
///
/// let signature = Signature::new()
///     .context("ctx")
///     .param(Param::typed::<String>("text"))
///     .with_doc("Echo text back");
///
/// let echo = SlashCommand::function("echo", signature, |_ctx: &(), args| {
///     args.get::<String>("text").unwrap_or_default()
/// })
/// .unwrap();
///
/// assert_eq!(echo.schema().description, "Echo text back");
/// let raw = json!({"text": "hello"});
/// assert_eq!(echo.invoke(&(), raw.as_object().unwrap()).unwrap(), "hello");
/// ```
pub struct SlashCommand<C, R = ()> {
    schema: CommandSchema,
    source: CommandSource,
    binder: Binder,
    invoker: Invoker<C, R>,
    on_bind_error: Option<ErrorReporter<C>>,
}

impl<C: 'static, R: 'static> SlashCommand<C, R> {
    /// Declares a function-style command.
    ///
    /// The description is the signature's doc string, or
    /// `"No Description Set"`.
    ///
    /// # Errors
    ///
    /// A [`DeclarationError`] naming the command when any declaration stage
    /// fails.
    pub fn function<F>(name: &str, signature: Signature, callback: F) -> Result<Self, DeclarationError>
    where
        F: Fn(&C, &BoundArguments) -> R + Send + Sync + 'static,
    {
        let description = signature.doc.as_deref().unwrap_or(DEFAULT_DESCRIPTION);
        let schema = declare_schema(name, description, &signature)?;

        let binder = signature
            .params
            .iter()
            .skip(1)
            .filter_map(|param| param.converter.clone().map(|c| (param.name.as_str(), c)))
            .fold(Binder::default(), |binder, (parameter, converter)| {
                binder.with_converter(parameter, converter)
            });

        debug!(command = %name, options = schema.options.len(), "Declared function command");

        Ok(Self {
            schema,
            source: CommandSource::Function,
            binder,
            invoker: Arc::new(move |ctx: &C, args: &BoundArguments| {
                Ok::<R, InvokeError>(callback(ctx, args))
            }),
            on_bind_error: None,
        })
    }

    /// Declares a class-based command.
    ///
    /// The description is the class doc string, or `"No Description Set"`.
    ///
    /// # Errors
    ///
    /// A [`DeclarationError`] naming the command when the class cannot be
    /// transformed, its options do not resolve, or an attribute's type
    /// cannot hold what its option binds.
    pub fn class<T: 'static>(name: &str, definition: ClassDefinition<T, C, R>) -> Result<Self, DeclarationError> {
        let adapter = Arc::new(transform(definition).map_err(|e| DeclarationError::new(name, e))?);

        let options = resolve_options(adapter.parameters(), &HashMap::new())
            .map_err(|e| DeclarationError::new(name, e))?;
        adapter
            .check_options(&options)
            .map_err(|e| DeclarationError::new(name, e))?;
        let description = adapter.doc().unwrap_or(DEFAULT_DESCRIPTION);
        let schema =
            build_schema(name, description, options).map_err(|e| DeclarationError::new(name, e))?;

        debug!(
            command = %name,
            class = %adapter.class(),
            options = schema.options.len(),
            "Declared class command"
        );

        let source = CommandSource::Class(adapter.class().to_string());
        let on_bind_error = adapter.has_error_callback().then(|| {
            let adapter = Arc::clone(&adapter);
            Arc::new(move |ctx: &C, err: &InvokeError| adapter.report_error(ctx, err))
                as ErrorReporter<C>
        });

        Ok(Self {
            schema,
            source,
            binder: Binder::default(),
            invoker: Arc::new(move |ctx: &C, args: &BoundArguments| adapter.invoke(ctx, args)),
            on_bind_error,
        })
    }
}

impl<C, R> SlashCommand<C, R> {
    /// Sets the permission bit set members need by default.
    pub fn with_default_member_permissions(mut self, bits: u64) -> Self {
        self.schema.default_member_permissions = Some(bits);
        self
    }

    /// Sets whether the command is available in direct messages.
    pub fn with_dm_permission(mut self, allowed: bool) -> Self {
        self.schema.dm_permission = allowed;
        self
    }

    /// Marks the command as age-restricted.
    pub fn with_nsfw(mut self, nsfw: bool) -> Self {
        self.schema.nsfw = nsfw;
        self
    }

    /// Sets how unknown option names are treated at invocation.
    ///
    /// A policy set here wins over any registry-wide default.
    pub fn with_unknown_options(mut self, policy: UnknownOptionPolicy) -> Self {
        self.binder = self.binder.with_policy(policy);
        self
    }

    /// Sets the unknown-option policy unless the command already has one.
    pub fn with_default_unknown_options(mut self, policy: UnknownOptionPolicy) -> Self {
        self.binder = self.binder.with_default_policy(policy);
        self
    }

    /// The unknown-option policy in effect for this command.
    pub fn unknown_options(&self) -> UnknownOptionPolicy {
        self.binder.policy()
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// The validated schema to register with the host.
    pub fn schema(&self) -> &CommandSchema {
        &self.schema
    }

    /// How the command was declared.
    pub fn source(&self) -> &CommandSource {
        &self.source
    }

    /// Binds `raw` against the schema and runs the handler.
    ///
    /// # Errors
    ///
    /// [`InvokeError::Bind`] when the values do not bind, or
    /// [`InvokeError::ClassInit`] when a class command cannot build its
    /// instance. Class commands pass either to their error hook first.
    pub fn invoke(&self, ctx: &C, raw: &Map<String, Value>) -> Result<R, InvokeError> {
        let args = match self.binder.bind(&self.schema, raw) {
            Ok(args) => args,
            Err(err) => {
                let err = InvokeError::Bind(err);
                if let Some(report) = &self.on_bind_error {
                    report(ctx, &err);
                }
                return Err(err);
            }
        };
        (self.invoker)(ctx, &args)
    }
}

impl<C, R> std::fmt::Debug for SlashCommand<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlashCommand")
            .field("name", &self.schema.name)
            .field("source", &self.source)
            .field("policy", &self.binder.policy())
            .finish_non_exhaustive()
    }
}
