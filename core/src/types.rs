//! Schema type definitions for slash command structure modeling.
//!
//! This module defines the protocol-facing data model: option kinds, channel
//! types, choices, the native values bound at invocation time, and the
//! validated [`CanonicalOption`] / [`CommandSchema`] pair handed to the host
//! framework. The serialized shape follows the application-command JSON
//! format field for field.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Version of the schema contract (semver).
///
/// Embedded in every [`SchemaPackage`](crate::SchemaPackage) to track
/// compatibility across schema versions.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Protocol value of the `type` field for chat-input (slash) commands.
pub const CHAT_INPUT_COMMAND_TYPE: u8 = 1;

/// Maximum number of options a single command may declare.
pub const MAX_OPTIONS: usize = 25;

/// Maximum number of choices a single option may declare.
pub const MAX_CHOICES: usize = 25;

/// Maximum length, in characters, of command and option names.
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum length, in characters, of descriptions and choice names.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Upper bound for `min_length` / `max_length` on string options.
pub const MAX_STRING_LENGTH: u16 = 6000;

/// Description used when the author does not supply one.
pub const DEFAULT_DESCRIPTION: &str = "No Description Set";

/// A 64-bit entity id.
///
/// Serialized as a decimal string; deserializes from either a string or an
/// integer.
///
/// # Examples
///
/// ```
/// use slash_schema_core::Snowflake;
///
/// let id: Snowflake = "80351110224678912".parse().unwrap();
/// assert_eq!(id, Snowflake(80351110224678912));
/// assert_eq!(serde_json::to_string(&id).unwrap(), "\"80351110224678912\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "SnowflakeRaw", into = "String")]
pub struct Snowflake(pub u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum SnowflakeRaw {
    Int(u64),
    Str(String),
}

impl TryFrom<SnowflakeRaw> for Snowflake {
    type Error = String;

    fn try_from(raw: SnowflakeRaw) -> Result<Self, Self::Error> {
        match raw {
            SnowflakeRaw::Int(id) => Ok(Snowflake(id)),
            SnowflakeRaw::Str(s) => s
                .parse()
                .map_err(|e| format!("invalid snowflake {s:?}: {e}")),
        }
    }
}

impl From<Snowflake> for String {
    fn from(id: Snowflake) -> Self {
        id.0.to_string()
    }
}

impl FromStr for Snowflake {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Snowflake)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Protocol kind of a command option.
///
/// Serialized as the integer value the protocol uses. Sub-command and
/// sub-command-group kinds (1 and 2) are not option kinds and are rejected on
/// deserialization.
///
/// # Examples
///
/// ```
/// use slash_schema_core::OptionKind;
///
/// assert_eq!(u8::from(OptionKind::Integer), 4);
/// assert!(OptionKind::try_from(1u8).is_err());
/// assert!(OptionKind::Number.supports_choices());
/// assert!(!OptionKind::User.supports_choices());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OptionKind {
    /// Free text.
    String = 3,
    /// Signed integer.
    Integer = 4,
    /// `true` / `false`.
    Boolean = 5,
    /// A user (or guild member).
    User = 6,
    /// Any channel, optionally narrowed by channel types.
    Channel = 7,
    /// A guild role.
    Role = 8,
    /// A user or a role.
    Mentionable = 9,
    /// Double-precision number.
    Number = 10,
    /// An uploaded file.
    Attachment = 11,
}

impl OptionKind {
    /// Returns `true` for kinds that accept a fixed choice list.
    pub fn supports_choices(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Number)
    }

    /// Returns `true` for kinds that can be autocompleted.
    pub fn supports_autocomplete(self) -> bool {
        self.supports_choices()
    }

    /// Returns `true` for kinds that accept `min_value` / `max_value`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }

    /// Returns `true` for kinds whose values are entity references.
    pub fn is_entity(self) -> bool {
        matches!(
            self,
            Self::User | Self::Channel | Self::Role | Self::Mentionable | Self::Attachment
        )
    }

    /// Lowercase name of the kind, as used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::User => "user",
            Self::Channel => "channel",
            Self::Role => "role",
            Self::Mentionable => "mentionable",
            Self::Number => "number",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OptionKind> for u8 {
    fn from(kind: OptionKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for OptionKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 | 2 => Err(format!(
                "option type {value} is a sub-command kind and cannot be used as an option"
            )),
            3 => Ok(Self::String),
            4 => Ok(Self::Integer),
            5 => Ok(Self::Boolean),
            6 => Ok(Self::User),
            7 => Ok(Self::Channel),
            8 => Ok(Self::Role),
            9 => Ok(Self::Mentionable),
            10 => Ok(Self::Number),
            11 => Ok(Self::Attachment),
            other => Err(format!("unknown option type {other}")),
        }
    }
}

/// Channel type restriction for channel options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChannelType {
    GuildText = 0,
    Dm = 1,
    GuildVoice = 2,
    GroupDm = 3,
    GuildCategory = 4,
    GuildAnnouncement = 5,
    AnnouncementThread = 10,
    PublicThread = 11,
    PrivateThread = 12,
    GuildStageVoice = 13,
    GuildDirectory = 14,
    GuildForum = 15,
    GuildMedia = 16,
}

impl From<ChannelType> for u8 {
    fn from(channel_type: ChannelType) -> Self {
        channel_type as u8
    }
}

impl TryFrom<u8> for ChannelType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            5 => Self::GuildAnnouncement,
            10 => Self::AnnouncementThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            13 => Self::GuildStageVoice,
            14 => Self::GuildDirectory,
            15 => Self::GuildForum,
            16 => Self::GuildMedia,
            other => return Err(format!("unknown channel type {other}")),
        })
    }
}

/// Value of a predefined choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Integer(i64),
    Number(f64),
    String(String),
}

impl ChoiceValue {
    /// Returns `true` when this value can be offered by an option of `kind`.
    ///
    /// Integer values are accepted by number options.
    pub fn fits(&self, kind: OptionKind) -> bool {
        matches!(
            (self, kind),
            (Self::String(_), OptionKind::String)
                | (Self::Integer(_), OptionKind::Integer)
                | (Self::Integer(_) | Self::Number(_), OptionKind::Number)
        )
    }

    /// Returns `true` when `value` is the bound form of this choice.
    pub fn matches(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (Self::String(a), OptionValue::String(b)) => a == b,
            (Self::Integer(a), OptionValue::Integer(b)) => a == b,
            (Self::Integer(a), OptionValue::Number(b)) => (*a as f64) == *b,
            (Self::Number(a), OptionValue::Number(b)) => a == b,
            (Self::Number(a), OptionValue::Integer(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ChoiceValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A predefined choice shown to the user.
///
/// # Examples
///
/// ```
/// use slash_schema_core::{Choice, ChoiceValue};
///
/// let choice = Choice::new("Small", 1);
/// assert_eq!(choice.value, ChoiceValue::Integer(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Label shown to the user (1-100 characters).
    pub name: String,
    /// Value delivered when the choice is picked.
    pub value: ChoiceValue,
}

impl Choice {
    /// Creates a choice.
    pub fn new(name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Native representation of one option value.
///
/// Produced by the argument binder from raw invocation data, and used as the
/// declared default of optional options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(Snowflake),
    Channel(Snowflake),
    Role(Snowflake),
    Mentionable(Snowflake),
    Attachment(Snowflake),
}

impl OptionValue {
    /// The option kind this value belongs to.
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::String(_) => OptionKind::String,
            Self::Integer(_) => OptionKind::Integer,
            Self::Number(_) => OptionKind::Number,
            Self::Boolean(_) => OptionKind::Boolean,
            Self::User(_) => OptionKind::User,
            Self::Channel(_) => OptionKind::Channel,
            Self::Role(_) => OptionKind::Role,
            Self::Mentionable(_) => OptionKind::Mentionable,
            Self::Attachment(_) => OptionKind::Attachment,
        }
    }

    /// Returns `true` when this value can stand for an option of `kind`.
    ///
    /// Integers fit number options, and user or role ids fit mentionable
    /// options.
    pub fn fits(&self, kind: OptionKind) -> bool {
        self.kind() == kind
            || matches!(
                (self, kind),
                (Self::Integer(_), OptionKind::Number)
                    | (Self::User(_) | Self::Role(_), OptionKind::Mentionable)
            )
    }

    /// Converts this value into the exact representation of `kind`, when it
    /// [`fits`](Self::fits).
    pub fn normalize(self, kind: OptionKind) -> Option<Self> {
        if self.kind() == kind {
            return Some(self);
        }
        match (self, kind) {
            (Self::Integer(i), OptionKind::Number) => Some(Self::Number(i as f64)),
            (Self::User(id) | Self::Role(id), OptionKind::Mentionable) => {
                Some(Self::Mentionable(id))
            }
            _ => None,
        }
    }

    /// Returns the entity id for reference values.
    pub fn snowflake(&self) -> Option<Snowflake> {
        match self {
            Self::User(id)
            | Self::Channel(id)
            | Self::Role(id)
            | Self::Mentionable(id)
            | Self::Attachment(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A resolved, protocol-ready command option.
///
/// The serialized form is exactly what the host framework forwards to the
/// remote service. The binding fields ([`parameter`](Self::parameter) and
/// [`default`](Self::default)) are kept in-process only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalOption {
    /// Protocol option kind.
    #[serde(rename = "type")]
    pub kind: OptionKind,
    /// Validated option name.
    pub name: String,
    /// Human-readable description (1-100 characters).
    pub description: String,
    /// Whether the user must supply a value.
    #[serde(default)]
    pub required: bool,
    /// Fixed choices, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Channel types a channel option is restricted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_types: Option<Vec<ChannelType>>,
    /// Lower bound for numeric options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Upper bound for numeric options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Minimum length for string options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    /// Maximum length for string options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    /// Whether values are suggested through autocomplete.
    #[serde(default, skip_serializing_if = "is_false")]
    pub autocomplete: bool,
    /// Name of the callable parameter this option binds to.
    #[serde(skip)]
    pub parameter: String,
    /// Value bound when an optional option is not supplied.
    #[serde(skip)]
    pub default: Option<OptionValue>,
}

impl CanonicalOption {
    /// Creates an option with no constraints, binding to a parameter of the
    /// same name.
    pub fn new(name: &str, kind: OptionKind, description: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            description: description.to_string(),
            required: true,
            choices: Vec::new(),
            channel_types: None,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            autocomplete: false,
            parameter: name.to_string(),
            default: None,
        }
    }

    /// Marks the option optional with the given default.
    pub fn with_default(mut self, default: Option<OptionValue>) -> Self {
        self.required = false;
        self.default = default;
        self
    }

    /// The parameter name values are bound under.
    ///
    /// Schemas read back from JSON carry no parameter names; the option name
    /// is used for them.
    pub fn binding_name(&self) -> &str {
        if self.parameter.is_empty() {
            &self.name
        } else {
            &self.parameter
        }
    }
}

fn default_command_type() -> u8 {
    CHAT_INPUT_COMMAND_TYPE
}

fn default_true() -> bool {
    true
}

mod permissions {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bits) => serializer.serialize_str(&bits.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|bits| bits.parse().map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Complete, validated schema for one slash command.
///
/// Instances produced by [`SchemaBuilder`](crate::SchemaBuilder) satisfy the
/// protocol invariants: required options precede optional ones, option names
/// are unique, and at most [`MAX_OPTIONS`] options are declared.
///
/// # Examples
///
/// ```
/// use slash_schema_core::*;
///
/// let schema = SchemaBuilder::new("echo", "Repeat a message")
///     .option(CanonicalOption::new("text", OptionKind::String, "What to say"))
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.option_names(), vec!["text"]);
/// assert!(schema.find_option("text").unwrap().required);
///
/// let json = serde_json::to_value(&schema).unwrap();
/// assert_eq!(json["type"], 1);
/// assert_eq!(json["options"][0]["type"], 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    /// Protocol command type; always chat-input.
    #[serde(rename = "type", default = "default_command_type")]
    pub command_type: u8,
    /// Command name.
    pub name: String,
    /// Command description.
    pub description: String,
    /// Ordered options.
    #[serde(default)]
    pub options: Vec<CanonicalOption>,
    /// Permission bit set members need by default.
    #[serde(
        default,
        with = "permissions",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_member_permissions: Option<u64>,
    /// Whether the command is usable in direct messages.
    #[serde(default = "default_true")]
    pub dm_permission: bool,
    /// Whether the command is restricted to age-gated channels.
    #[serde(default)]
    pub nsfw: bool,
}

impl CommandSchema {
    /// Creates an empty schema. No validation is performed; use
    /// [`SchemaBuilder`](crate::SchemaBuilder) for that.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            command_type: CHAT_INPUT_COMMAND_TYPE,
            name: name.to_string(),
            description: description.to_string(),
            options: Vec::new(),
            default_member_permissions: None,
            dm_permission: true,
            nsfw: false,
        }
    }

    /// Finds an option by its protocol name.
    pub fn find_option(&self, name: &str) -> Option<&CanonicalOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Gets all option names, in schema order.
    pub fn option_names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }

    /// Gets the required options, in schema order.
    pub fn required_options(&self) -> Vec<&CanonicalOption> {
        self.options.iter().filter(|o| o.required).collect()
    }
}
