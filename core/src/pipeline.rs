//! Declaration-time pipeline: reflect, resolve, build.

use std::collections::HashMap;

use crate::error::{DeclarationError, SchemaError};
use crate::resolve::resolve_option;
use crate::signature::{reflect, ReflectedParameter, Signature};
use crate::types::{CanonicalOption, CommandSchema};
use crate::validate::build_schema;

/// Resolves every parameter, applying sidecar descriptions keyed by option
/// name.
pub fn resolve_options(
    params: &[ReflectedParameter],
    descriptions: &HashMap<String, String>,
) -> Result<Vec<CanonicalOption>, SchemaError> {
    params
        .iter()
        .map(|param| {
            let mut option = resolve_option(param)?;
            if let Some(description) = descriptions.get(&option.name) {
                option.description = description.clone();
            }
            Ok(option)
        })
        .collect()
}

/// Runs the whole declaration pipeline for a function-style command.
///
/// # Examples
///
/// ```
/// use slash_schema_core::*;
///
/// let signature = Signature::new()
///     .context("ctx")
///     .param(Param::typed::<entity::User>("target"))
///     .param(Param::typed::<i64>("days").with_default(1))
///     .describe("target", "Who to remind");
///
/// let schema = declare_schema("remind", "Set a reminder", &signature).unwrap();
/// assert_eq!(schema.option_names(), vec!["target", "days"]);
/// assert_eq!(schema.options[0].description, "Who to remind");
/// assert!(!schema.options[1].required);
/// ```
///
/// # Errors
///
/// A [`DeclarationError`] naming the command and wrapping the first
/// [`SchemaError`] raised by any stage.
pub fn declare_schema(
    name: &str,
    description: &str,
    signature: &Signature,
) -> Result<CommandSchema, DeclarationError> {
    let params = reflect(signature).map_err(|e| DeclarationError::new(name, e))?;
    let options = resolve_options(&params, &signature.descriptions)
        .map_err(|e| DeclarationError::new(name, e))?;

    build_schema(name, description, options).map_err(|e| DeclarationError::new(name, e))
}
