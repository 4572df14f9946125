//! The option resolver: one reflected parameter in, one canonical option out.
//!
//! Explicit descriptor fields always win. Whatever the descriptor leaves
//! open is inferred from the parameter's annotation and default.

use tracing::debug;

use crate::descriptor::OptionDescriptor;
use crate::error::SchemaError;
use crate::signature::{ParamDefault, ReflectedParameter};
use crate::types::{CanonicalOption, OptionKind, MAX_CHOICES, MAX_DESCRIPTION_LENGTH, MAX_STRING_LENGTH};
use crate::validate::{check_description, normalize_name, validate_name};

/// Resolves one parameter into a canonical option.
///
/// # Examples
///
/// ```
/// use slash_schema_core::*;
///
/// let param = ReflectedParameter::new(1, "count", Some(Annotation::Int), ParamDefault::Value(5.into()));
/// let option = resolve_option(&param).unwrap();
///
/// assert_eq!(option.kind, OptionKind::Integer);
/// assert!(!option.required);
/// assert_eq!(option.default, Some(OptionValue::Integer(5)));
/// ```
///
/// # Errors
///
/// - [`SchemaError::TypeInference`] when no kind hint is given and the
///   annotation is missing or has no protocol mapping.
/// - [`SchemaError::NameValidation`] when the resulting name is invalid.
/// - [`SchemaError::OptionConfig`] when descriptor fields are inapplicable to
///   the kind or contradict each other.
pub fn resolve_option(param: &ReflectedParameter) -> Result<CanonicalOption, SchemaError> {
    let (descriptor, explicit) = match &param.default {
        ParamDefault::Descriptor(descriptor) => (descriptor.clone(), true),
        ParamDefault::Value(value) => {
            let mut descriptor = OptionDescriptor::default();
            descriptor.default = Some(value.clone());
            (descriptor, false)
        }
        ParamDefault::Missing => (OptionDescriptor::default(), false),
    };

    let kind = resolve_kind(param, &descriptor)?;

    let name = match &descriptor.name {
        Some(name) => name.clone(),
        None => normalize_name(&param.name),
    };
    validate_name(&name)?;

    let optional_annotation = param
        .annotation
        .as_ref()
        .is_some_and(|annotation| annotation.is_optional());

    let required = match descriptor.required {
        Some(required) => required,
        None => descriptor.default.is_none() && !optional_annotation,
    };

    let default = match descriptor.default.clone() {
        Some(value) => Some(value.clone().normalize(kind).ok_or_else(|| {
            SchemaError::option_config(
                &name,
                format!("default {value:?} does not fit a {kind} option"),
            )
        })?),
        None => None,
    };

    let channel_types = match (&descriptor.channel_types, kind) {
        (Some(types), _) => Some(types.clone()),
        (None, OptionKind::Channel) => param.annotation.as_ref().and_then(|a| a.channel_types()),
        (None, _) => None,
    };

    let option = CanonicalOption {
        kind,
        name,
        description: descriptor.description.clone(),
        required,
        choices: descriptor.choices.clone(),
        channel_types,
        min_value: descriptor.min_value,
        max_value: descriptor.max_value,
        min_length: descriptor.min_length,
        max_length: descriptor.max_length,
        autocomplete: descriptor.autocomplete,
        parameter: param.name.clone(),
        default,
    };

    check_consistency(&option)?;

    debug!(
        parameter = %param.name,
        option = %option.name,
        kind = %option.kind,
        required = option.required,
        explicit,
        "Resolved option"
    );

    Ok(option)
}

fn resolve_kind(param: &ReflectedParameter, descriptor: &OptionDescriptor) -> Result<OptionKind, SchemaError> {
    if let Some(kind) = descriptor.kind_hint {
        return Ok(kind);
    }

    match &param.annotation {
        Some(annotation) => annotation
            .option_kind()
            .ok_or_else(|| SchemaError::TypeInference {
                parameter: param.name.clone(),
                reason: format!("{annotation:?} has no option type"),
            }),
        None if param.converter.is_some() => Ok(OptionKind::String),
        None => Err(SchemaError::TypeInference {
            parameter: param.name.clone(),
            reason: "no annotation or kind given".to_string(),
        }),
    }
}

/// Checks one resolved option against the protocol's per-option rules.
pub(crate) fn check_consistency(option: &CanonicalOption) -> Result<(), SchemaError> {
    let name = option.name.as_str();
    let kind = option.kind;
    let fail = |reason: String| Err(SchemaError::option_config(name, reason));

    check_description(name, &option.description)?;

    if let Some(default) = &option.default {
        if option.required {
            return fail("a required option cannot declare a default".to_string());
        }
        if !default.fits(kind) {
            return fail(format!("default {default:?} does not fit a {kind} option"));
        }
    }

    if !option.choices.is_empty() {
        if !kind.supports_choices() {
            return fail(format!("choices cannot be used with {kind} options"));
        }
        if option.autocomplete {
            return fail("autocomplete cannot be combined with choices".to_string());
        }
        if option.choices.len() > MAX_CHOICES {
            return fail(format!(
                "{} choices declared, the maximum is {MAX_CHOICES}",
                option.choices.len()
            ));
        }
        for choice in &option.choices {
            let length = choice.name.chars().count();
            if length == 0 || length > MAX_DESCRIPTION_LENGTH {
                return fail(format!(
                    "choice name {:?} must be 1-{MAX_DESCRIPTION_LENGTH} characters",
                    choice.name
                ));
            }
            if !choice.value.fits(kind) {
                return fail(format!(
                    "choice {:?} does not fit a {kind} option",
                    choice.name
                ));
            }
        }
    }

    if option.autocomplete && !kind.supports_autocomplete() {
        return fail(format!("autocomplete cannot be used with {kind} options"));
    }

    if option.min_value.is_some() || option.max_value.is_some() {
        if !kind.is_numeric() {
            return fail(format!("min/max value cannot be used with {kind} options"));
        }
        for bound in [option.min_value, option.max_value].into_iter().flatten() {
            if kind == OptionKind::Integer && bound.fract() != 0.0 {
                return fail(format!("bound {bound} must be an integer for integer options"));
            }
        }
        if let (Some(min), Some(max)) = (option.min_value, option.max_value) {
            if min > max {
                return fail(format!("min value {min} is greater than max value {max}"));
            }
        }
    }

    if option.min_length.is_some() || option.max_length.is_some() {
        if kind != OptionKind::String {
            return fail(format!("min/max length cannot be used with {kind} options"));
        }
        if option.min_length.is_some_and(|min| min > MAX_STRING_LENGTH) {
            return fail(format!("min length must be at most {MAX_STRING_LENGTH}"));
        }
        if option
            .max_length
            .is_some_and(|max| max == 0 || max > MAX_STRING_LENGTH)
        {
            return fail(format!("max length must be 1-{MAX_STRING_LENGTH}"));
        }
        if let (Some(min), Some(max)) = (option.min_length, option.max_length) {
            if min > max {
                return fail(format!("min length {min} is greater than max length {max}"));
            }
        }
    }

    if option.channel_types.is_some() && kind != OptionKind::Channel {
        return fail(format!("channel types cannot be used with {kind} options"));
    }

    Ok(())
}
