//! Name rules, whole-command validation and the schema builder.
//!
//! [`SchemaBuilder`] is the single point where a command's shape is
//! certified before it reaches the host framework. It fails fast on the
//! first problem. [`validate_schema`] re-checks an existing schema (for
//! example one read back from JSON) and reports every problem it finds.
//!
//! # Examples
//!
//! ```
//! use slash_schema_core::*;
//!
//! let optional = CanonicalOption::new("b", OptionKind::String, "B").with_default(None);
//! let required = CanonicalOption::new("a", OptionKind::String, "A");
//!
//! let err = SchemaBuilder::new("demo", "Demo")
//!     .option(optional)
//!     .option(required)
//!     .build()
//!     .unwrap_err();
//! assert!(matches!(err, SchemaError::SchemaOrdering { .. }));
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::SchemaError;
use crate::resolve::check_consistency;
use crate::types::{
    CanonicalOption, CommandSchema, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_OPTIONS,
};

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-_\p{L}\p{N}\p{Devanagari}\p{Thai}]{1,32}$").expect("static regex must compile")
});

/// Checks a command or option name against the protocol naming rules.
///
/// Names are 1-32 characters of letters, digits, `-` and `_` (Devanagari and
/// Thai marks included) and contain no upper-case letters.
///
/// # Examples
///
/// ```
/// use slash_schema_core::validate_name;
///
/// assert!(validate_name("roll-dice").is_ok());
/// assert!(validate_name("größe").is_ok());
/// assert!(validate_name("Roll").is_err());
/// assert!(validate_name("two words").is_err());
/// assert!(validate_name("").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), SchemaError> {
    let invalid = |reason: &str| SchemaError::NameValidation {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let length = name.chars().count();
    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(invalid("must be 1-32 characters long"));
    }
    if !NAME_RE.is_match(name) {
        return Err(invalid(
            "may only contain letters, digits, `-` and `_`",
        ));
    }
    if name.chars().any(char::is_uppercase) {
        return Err(invalid("must be lower case"));
    }
    Ok(())
}

/// Derives an option name from a parameter name by lower-casing it.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

pub(crate) fn check_description(subject: &str, description: &str) -> Result<(), SchemaError> {
    let length = description.chars().count();
    if length == 0 || length > MAX_DESCRIPTION_LENGTH {
        return Err(SchemaError::option_config(
            subject,
            format!("description must be 1-{MAX_DESCRIPTION_LENGTH} characters, got {length}"),
        ));
    }
    Ok(())
}

/// Assembles and certifies a [`CommandSchema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: CommandSchema,
}

impl SchemaBuilder {
    /// Starts a schema for the named command.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            schema: CommandSchema::new(name, description),
        }
    }

    /// Appends an option.
    pub fn option(mut self, option: CanonicalOption) -> Self {
        self.schema.options.push(option);
        self
    }

    /// Appends several options in order.
    pub fn options(mut self, options: impl IntoIterator<Item = CanonicalOption>) -> Self {
        self.schema.options.extend(options);
        self
    }

    /// Sets the permission bits members need by default.
    pub fn default_member_permissions(mut self, bits: u64) -> Self {
        self.schema.default_member_permissions = Some(bits);
        self
    }

    /// Sets whether the command is available in direct messages.
    pub fn dm_permission(mut self, allowed: bool) -> Self {
        self.schema.dm_permission = allowed;
        self
    }

    /// Marks the command as age-gated.
    pub fn nsfw(mut self, nsfw: bool) -> Self {
        self.schema.nsfw = nsfw;
        self
    }

    /// Validates the command as a whole and returns the schema.
    ///
    /// Options are never reordered: a required option declared after an
    /// optional one is an error.
    ///
    /// # Errors
    ///
    /// The first [`SchemaError`] found: invalid command name or description,
    /// too many options, duplicate option names, or
    /// [`SchemaError::SchemaOrdering`].
    pub fn build(self) -> Result<CommandSchema, SchemaError> {
        let schema = self.schema;
        if let Some(err) = validate_schema(&schema).into_iter().next() {
            return Err(err);
        }
        debug!(
            command = %schema.name,
            options = schema.options.len(),
            "Built command schema"
        );
        Ok(schema)
    }
}

/// Builds a schema from already resolved options.
///
/// Shorthand for [`SchemaBuilder`] without permission settings.
///
/// # Errors
///
/// As [`SchemaBuilder::build`].
pub fn build_schema(
    name: &str,
    description: &str,
    options: impl IntoIterator<Item = CanonicalOption>,
) -> Result<CommandSchema, SchemaError> {
    SchemaBuilder::new(name, description).options(options).build()
}

/// Validates a command schema, returning every problem found.
///
/// Checks the command name and description, the option count, option name
/// rules and uniqueness, each option's own consistency (description,
/// choices, bounds, channel types, default), and the required-before-optional
/// ordering.
pub fn validate_schema(schema: &CommandSchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if let Err(err) = validate_name(&schema.name) {
        errors.push(err);
    }
    if let Err(err) = check_description(&schema.name, &schema.description) {
        errors.push(err);
    }

    if schema.options.len() > MAX_OPTIONS {
        errors.push(SchemaError::TooManyOptions {
            count: schema.options.len(),
            max: MAX_OPTIONS,
        });
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut first_optional: Option<&str> = None;

    for option in &schema.options {
        if let Err(err) = validate_name(&option.name) {
            errors.push(err);
        }
        if !seen.insert(option.name.as_str()) {
            errors.push(SchemaError::DuplicateOption(option.name.clone()));
        }
        if let Err(err) = check_consistency(option) {
            errors.push(err);
        }

        match (option.required, first_optional) {
            (true, Some(optional)) => errors.push(SchemaError::SchemaOrdering {
                required: option.name.clone(),
                optional: optional.to_string(),
            }),
            (false, None) => first_optional = Some(option.name.as_str()),
            _ => {}
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use crate::types::OptionKind;

    use super::*;

    fn required(name: &str) -> CanonicalOption {
        CanonicalOption::new(name, OptionKind::String, "Required option")
    }

    fn optional(name: &str) -> CanonicalOption {
        CanonicalOption::new(name, OptionKind::String, "Optional option").with_default(None)
    }

    #[test]
    fn test_validate_name_length_bounds() {
        assert!(validate_name(&"a".repeat(32)).is_ok());
        assert!(matches!(
            validate_name(&"a".repeat(33)),
            Err(SchemaError::NameValidation { .. })
        ));
    }

    #[test]
    fn test_validate_name_accepts_scripts() {
        assert!(validate_name("नमस्ते").is_ok());
        assert!(validate_name("สวัสดี").is_ok());
        assert!(validate_name("名前").is_ok());
    }

    #[test]
    fn test_normalize_name_lowercases() {
        assert_eq!(normalize_name("UserName"), "username");
    }

    #[test]
    fn test_build_accepts_required_then_optional() {
        let schema = SchemaBuilder::new("demo", "Demo")
            .option(required("a"))
            .option(optional("b"))
            .build()
            .unwrap();
        assert_eq!(schema.option_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_build_rejects_required_after_optional() {
        let err = SchemaBuilder::new("demo", "Demo")
            .option(optional("b"))
            .option(required("a"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::SchemaOrdering {
                required: "a".into(),
                optional: "b".into(),
            }
        );
    }

    #[test]
    fn test_build_rejects_duplicates() {
        let err = SchemaBuilder::new("demo", "Demo")
            .option(required("a"))
            .option(required("a"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateOption("a".into()));
    }

    #[test]
    fn test_build_rejects_too_many_options() {
        let options = (0..26).map(|i| required(&format!("opt{i}")));
        let err = SchemaBuilder::new("demo", "Demo")
            .options(options)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::TooManyOptions { count: 26, max: 25 });
    }

    #[test]
    fn test_build_rejects_bad_command_name() {
        let err = SchemaBuilder::new("Demo", "Demo").build().unwrap_err();
        assert!(matches!(err, SchemaError::NameValidation { .. }));
    }

    #[test]
    fn test_build_rejects_empty_description() {
        let err = SchemaBuilder::new("demo", "").build().unwrap_err();
        assert!(matches!(err, SchemaError::OptionConfig { .. }));
    }

    #[test]
    fn test_validate_schema_reports_all_problems() {
        let mut schema = CommandSchema::new("demo", "Demo");
        schema.options.push(optional("b"));
        schema.options.push(required("a"));
        schema.options.push(required("a"));

        let errors = validate_schema(&schema);
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&SchemaError::DuplicateOption("a".into())));
    }

    #[test]
    fn test_validate_schema_rechecks_option_consistency() {
        let mut flag = CanonicalOption::new("flag", OptionKind::Boolean, "Flag");
        flag.choices = vec![crate::types::Choice::new("Yes", "yes")];
        let mut text = CanonicalOption::new("text", OptionKind::String, "Text");
        text.min_value = Some(1.0);
        let mut count = CanonicalOption::new("count", OptionKind::Integer, "Count");
        count.default = Some(3.into());

        let mut schema = CommandSchema::new("demo", "Demo");
        schema.options = vec![flag, text, count];

        let errors = validate_schema(&schema);
        assert_eq!(errors.len(), 3);
        for name in ["flag", "text", "count"] {
            assert!(
                errors
                    .iter()
                    .any(|e| matches!(e, SchemaError::OptionConfig { option, .. } if option == name)),
                "no error for {name}: {errors:?}"
            );
        }
    }
}
