//! The argument binder: raw invocation values back onto parameters.
//!
//! The host framework delivers each invocation as a map of option name to
//! raw JSON value. [`Binder::bind`] checks that map against a
//! [`CommandSchema`], coerces each value to its option's native form, fills
//! in defaults, and returns [`BoundArguments`] keyed by parameter name in
//! declaration order.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use slash_schema_core::*;
//!
//! let schema = SchemaBuilder::new("greet", "Say hello")
//!     .option(
//!         CanonicalOption::new("greeting", OptionKind::String, "Greeting")
//!             .with_default(Some("hi".into())),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let binder = Binder::default();
//! let args = binder.bind(&schema, &serde_json::Map::new()).unwrap();
//! assert_eq!(args.get::<String>("greeting").unwrap(), "hi");
//!
//! let raw = json!({"greeting": "yo"});
//! let args = binder.bind(&schema, raw.as_object().unwrap()).unwrap();
//! assert_eq!(args.get::<String>("greeting").unwrap(), "yo");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::BindError;
use crate::signature::Converter;
use crate::types::{CanonicalOption, CommandSchema, OptionKind, OptionValue, Snowflake};

/// What to do with supplied values for options the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOptionPolicy {
    /// Drop them silently (logged at `warn`).
    #[default]
    Ignore,
    /// Fail the invocation with [`BindError::UnknownOption`].
    Reject,
}

/// Binds raw invocation values to a schema's parameters.
///
/// A binder built with [`Binder::default`] has no policy of its own and
/// falls back to [`UnknownOptionPolicy::Ignore`] until
/// [`with_default_policy`](Self::with_default_policy) supplies one.
#[derive(Debug, Clone, Default)]
pub struct Binder {
    policy: Option<UnknownOptionPolicy>,
    converters: HashMap<String, Converter>,
}

impl Binder {
    /// Creates a binder with the given unknown-option policy.
    pub fn new(policy: UnknownOptionPolicy) -> Self {
        Self {
            policy: Some(policy),
            converters: HashMap::new(),
        }
    }

    /// The unknown-option policy in effect.
    pub fn policy(&self) -> UnknownOptionPolicy {
        self.policy.unwrap_or_default()
    }

    /// Returns `true` if a policy was set on this binder explicitly.
    pub fn has_explicit_policy(&self) -> bool {
        self.policy.is_some()
    }

    /// Replaces the unknown-option policy, keeping registered converters.
    pub fn with_policy(mut self, policy: UnknownOptionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the policy only if none was set explicitly.
    pub fn with_default_policy(mut self, policy: UnknownOptionPolicy) -> Self {
        self.policy = self.policy.or(Some(policy));
        self
    }

    /// Registers a converter for the named parameter.
    pub fn with_converter(mut self, parameter: &str, converter: Converter) -> Self {
        self.converters.insert(parameter.to_string(), converter);
        self
    }

    /// Binds `supplied` against `schema`.
    ///
    /// # Errors
    ///
    /// - [`BindError::UnknownOption`] under [`UnknownOptionPolicy::Reject`]
    ///   when `supplied` names an option the schema lacks.
    /// - [`BindError::MissingOption`] when a required option is absent.
    /// - [`BindError::Coercion`] when a value does not fit its option, or a
    ///   converter rejects it.
    pub fn bind(
        &self,
        schema: &CommandSchema,
        supplied: &Map<String, Value>,
    ) -> Result<BoundArguments, BindError> {
        for name in supplied.keys() {
            if schema.find_option(name).is_none() {
                match self.policy() {
                    UnknownOptionPolicy::Reject => {
                        return Err(BindError::UnknownOption(name.clone()));
                    }
                    UnknownOptionPolicy::Ignore => {
                        warn!(command = %schema.name, option = %name, "Ignoring unknown option");
                    }
                }
            }
        }

        let mut values = Vec::with_capacity(schema.options.len());

        for option in &schema.options {
            let value = match supplied.get(&option.name) {
                Some(Value::Null) | None if option.required => {
                    return Err(BindError::MissingOption(option.name.clone()));
                }
                Some(Value::Null) | None => option.default.clone(),
                Some(raw) => {
                    let value = coerce(option, raw)?;
                    check_constraints(option, &value)?;
                    match self.converters.get(option.binding_name()) {
                        Some(converter) => Some(converter.convert(value).map_err(|reason| {
                            BindError::Coercion {
                                option: option.name.clone(),
                                expected: option.kind,
                                reason,
                            }
                        })?),
                        None => Some(value),
                    }
                }
            };

            debug!(
                command = %schema.name,
                option = %option.name,
                bound = value.is_some(),
                "Bound option"
            );
            values.push((option.binding_name().to_string(), value));
        }

        Ok(BoundArguments { values })
    }
}

/// Binds with the default policy and no converters.
pub fn bind_arguments(
    schema: &CommandSchema,
    supplied: &Map<String, Value>,
) -> Result<BoundArguments, BindError> {
    Binder::default().bind(schema, supplied)
}

fn coercion(option: &CanonicalOption, reason: impl Into<String>) -> BindError {
    BindError::Coercion {
        option: option.name.clone(),
        expected: option.kind,
        reason: reason.into(),
    }
}

/// Converts one raw value to the native form of `option`'s kind.
///
/// Numbers may arrive as JSON numbers or numeric strings, booleans as JSON
/// booleans or `"true"` / `"false"`, and entity references as snowflake
/// strings or integers.
pub fn coerce(option: &CanonicalOption, raw: &Value) -> Result<OptionValue, BindError> {
    let mismatch = || coercion(option, format!("got {raw}"));

    match option.kind {
        OptionKind::String => match raw {
            Value::String(s) => Ok(OptionValue::String(s.clone())),
            _ => Err(mismatch()),
        },
        OptionKind::Integer => match raw {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64))
                .map(OptionValue::Integer)
                .ok_or_else(mismatch),
            Value::String(s) => s
                .trim()
                .parse()
                .map(OptionValue::Integer)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        OptionKind::Number => match raw {
            Value::Number(n) => n.as_f64().map(OptionValue::Number).ok_or_else(mismatch),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(OptionValue::Number)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        OptionKind::Boolean => match raw {
            Value::Bool(b) => Ok(OptionValue::Boolean(*b)),
            Value::String(s) => match s.trim() {
                "true" => Ok(OptionValue::Boolean(true)),
                "false" => Ok(OptionValue::Boolean(false)),
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        },
        kind => {
            let id = snowflake(raw).ok_or_else(mismatch)?;
            Ok(match kind {
                OptionKind::User => OptionValue::User(id),
                OptionKind::Channel => OptionValue::Channel(id),
                OptionKind::Role => OptionValue::Role(id),
                OptionKind::Mentionable => OptionValue::Mentionable(id),
                _ => OptionValue::Attachment(id),
            })
        }
    }
}

fn snowflake(raw: &Value) -> Option<Snowflake> {
    match raw {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(Snowflake),
        _ => None,
    }
}

fn check_constraints(option: &CanonicalOption, value: &OptionValue) -> Result<(), BindError> {
    if !option.choices.is_empty() && !option.choices.iter().any(|c| c.value.matches(value)) {
        return Err(coercion(option, "value is not one of the declared choices"));
    }

    let number = match value {
        OptionValue::Integer(i) => Some(*i as f64),
        OptionValue::Number(f) => Some(*f),
        _ => None,
    };
    if let Some(number) = number {
        if option.min_value.is_some_and(|min| number < min) {
            return Err(coercion(option, format!("{number} is below the minimum")));
        }
        if option.max_value.is_some_and(|max| number > max) {
            return Err(coercion(option, format!("{number} is above the maximum")));
        }
    }

    if let OptionValue::String(s) = value {
        let length = s.chars().count();
        if option.min_length.is_some_and(|min| length < usize::from(min)) {
            return Err(coercion(option, format!("length {length} is below the minimum")));
        }
        if option.max_length.is_some_and(|max| length > usize::from(max)) {
            return Err(coercion(option, format!("length {length} is above the maximum")));
        }
    }

    Ok(())
}

/// Native Rust types a bound value can be extracted as.
pub trait FromOptionValue: Sized {
    /// Extracts from a present value; `None` when the value has another kind.
    fn from_value(value: &OptionValue) -> Option<Self>;

    /// The result for an absent value; `None` when absence is not allowed.
    fn from_absent() -> Option<Self> {
        None
    }
}

impl FromOptionValue for OptionValue {
    fn from_value(value: &OptionValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromOptionValue for String {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromOptionValue for bool {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromOptionValue for f64 {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Number(f) => Some(*f),
            OptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromOptionValue for f32 {
    fn from_value(value: &OptionValue) -> Option<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromOptionValue for Snowflake {
    fn from_value(value: &OptionValue) -> Option<Self> {
        value.snowflake()
    }
}

macro_rules! from_integer {
    ($($ty:ty),+) => {
        $(
            impl FromOptionValue for $ty {
                fn from_value(value: &OptionValue) -> Option<Self> {
                    match value {
                        OptionValue::Integer(i) => <$ty>::try_from(*i).ok(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl<T: FromOptionValue> FromOptionValue for Option<T> {
    fn from_value(value: &OptionValue) -> Option<Self> {
        T::from_value(value).map(Some)
    }

    fn from_absent() -> Option<Self> {
        Some(None)
    }
}

/// The bound call arguments of one invocation.
///
/// Keyed by parameter name, in declaration order. An entry of `None` means
/// the option was optional, not supplied, and had no default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundArguments {
    values: Vec<(String, Option<OptionValue>)>,
}

impl BoundArguments {
    /// Creates bound arguments directly.
    pub fn from_values(values: Vec<(String, Option<OptionValue>)>) -> Self {
        Self { values }
    }

    /// The raw bound value for `parameter`.
    ///
    /// Returns `None` when no such parameter exists and `Some(None)` when it
    /// is bound to nothing.
    pub fn value(&self, parameter: &str) -> Option<Option<&OptionValue>> {
        self.values
            .iter()
            .find(|(name, _)| name == parameter)
            .map(|(_, value)| value.as_ref())
    }

    /// Extracts `parameter` as `T`.
    ///
    /// # Errors
    ///
    /// [`BindError::MissingOption`] when the parameter is unknown or unbound
    /// and `T` does not admit absence; [`BindError::Coercion`] when the value
    /// does not convert to `T`.
    pub fn get<T: FromOptionValue>(&self, parameter: &str) -> Result<T, BindError> {
        match self.value(parameter) {
            Some(Some(value)) => T::from_value(value).ok_or_else(|| BindError::Coercion {
                option: parameter.to_string(),
                expected: value.kind(),
                reason: format!("cannot extract as {}", std::any::type_name::<T>()),
            }),
            Some(None) | None => {
                T::from_absent().ok_or_else(|| BindError::MissingOption(parameter.to_string()))
            }
        }
    }

    /// Iterates over `(parameter, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&OptionValue>)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no parameters are bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the arguments, yielding `(parameter, value)` pairs.
    pub fn into_values(self) -> Vec<(String, Option<OptionValue>)> {
        self.values
    }
}
