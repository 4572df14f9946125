//! Explicit per-option metadata supplied by command authors.

use crate::types::{ChannelType, Choice, ChoiceValue, OptionKind, OptionValue, DEFAULT_DESCRIPTION};

/// Explicit metadata for one declared option.
///
/// Attached to a parameter through [`Param::with_option`](crate::Param::with_option)
/// or to a class attribute through
/// `ClassDefinition::option`. Every field except the description is
/// optional; absent fields are filled in by the option resolver from the
/// parameter's annotation and default.
///
/// # Examples
///
/// ```
/// use slash_schema_core::{OptionDescriptor, OptionKind};
///
/// let descriptor = OptionDescriptor::new("How many dice to roll")
///     .with_name("dice")
///     .with_kind(OptionKind::Integer)
///     .with_min_value(1.0)
///     .with_max_value(10.0)
///     .with_default(1);
///
/// assert_eq!(descriptor.name.as_deref(), Some("dice"));
/// assert_eq!(descriptor.required, None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    /// Name override; defaults to the parameter name.
    pub name: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// Kind override; defaults to the kind inferred from the annotation.
    pub kind_hint: Option<OptionKind>,
    /// Required override; defaults to "required iff no default".
    pub required: Option<bool>,
    /// Value bound when the option is not supplied.
    pub default: Option<OptionValue>,
    /// Fixed choices.
    pub choices: Vec<Choice>,
    /// Lower numeric bound.
    pub min_value: Option<f64>,
    /// Upper numeric bound.
    pub max_value: Option<f64>,
    /// Minimum string length.
    pub min_length: Option<u16>,
    /// Maximum string length.
    pub max_length: Option<u16>,
    /// Whether values come from autocomplete.
    pub autocomplete: bool,
    /// Channel type restriction.
    pub channel_types: Option<Vec<ChannelType>>,
}

impl Default for OptionDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_DESCRIPTION)
    }
}

impl OptionDescriptor {
    /// Creates a descriptor with only a description set.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            name: None,
            description: description.into(),
            kind_hint: None,
            required: None,
            default: None,
            choices: Vec::new(),
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            autocomplete: false,
            channel_types: None,
        }
    }

    /// Overrides the option name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the option kind.
    pub fn with_kind(mut self, kind: OptionKind) -> Self {
        self.kind_hint = Some(kind);
        self
    }

    /// Sets requiredness explicitly.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<OptionValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Appends a choice.
    pub fn with_choice(mut self, name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        self.choices.push(Choice::new(name, value));
        self
    }

    /// Appends several choices.
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = Choice>) -> Self {
        self.choices.extend(choices);
        self
    }

    pub fn with_min_value(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn with_max_value(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn with_min_length(mut self, min: u16) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: u16) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Marks the option as autocompleted.
    pub fn with_autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }

    /// Restricts a channel option to the given channel types.
    pub fn with_channel_types(mut self, types: impl IntoIterator<Item = ChannelType>) -> Self {
        self.channel_types = Some(types.into_iter().collect());
        self
    }
}
