//! Parameter type annotations and their mapping to option kinds.
//!
//! Rust cannot inspect a function's parameter types at runtime, so commands
//! describe each parameter's type with an [`Annotation`]. The [`OptionType`]
//! trait derives the annotation from a Rust type, which keeps declarations
//! close to the callback's own signature:
//!
//! ```
//! use slash_schema_core::{Annotation, OptionKind, OptionType, entity::User};
//!
//! assert_eq!(i64::annotation().option_kind(), Some(OptionKind::Integer));
//! assert_eq!(User::annotation().option_kind(), Some(OptionKind::User));
//! assert!(Option::<String>::annotation().is_optional());
//! ```

use crate::types::{ChannelType, OptionKind, OptionValue};

/// Declared type of a command parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Text.
    Str,
    /// Any integer type.
    Int,
    /// Any floating point type.
    Float,
    /// Boolean.
    Bool,
    /// A user.
    User,
    /// A guild member.
    Member,
    /// A role.
    Role,
    /// An attachment.
    Attachment,
    /// A user or a role.
    Mentionable,
    /// A channel; `Some` for one specific channel class.
    Channel(Option<ChannelType>),
    /// A value that may be absent.
    Optional(Box<Annotation>),
    /// Any one of several types.
    Union(Vec<Annotation>),
    /// An explicit protocol option kind.
    Kind(OptionKind),
    /// A type without a protocol mapping.
    Other(String),
}

impl Annotation {
    /// Wraps an annotation as optional.
    pub fn optional(inner: Annotation) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Builds a union annotation.
    pub fn union(members: impl IntoIterator<Item = Annotation>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    /// Returns `true` when the annotation admits absence.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Optional(_) => true,
            Self::Union(members) => members.iter().any(Annotation::is_optional),
            _ => false,
        }
    }

    /// Strips optional wrappers, returning the underlying annotation.
    pub fn strip_optional(&self) -> &Annotation {
        match self {
            Self::Optional(inner) => inner.strip_optional(),
            other => other,
        }
    }

    /// Maps the annotation to a protocol option kind, if it has one.
    ///
    /// # Examples
    ///
    /// ```
    /// use slash_schema_core::{Annotation, OptionKind};
    ///
    /// let mentionable = Annotation::union([Annotation::Role, Annotation::User, Annotation::Member]);
    /// assert_eq!(mentionable.option_kind(), Some(OptionKind::Mentionable));
    ///
    /// let users = Annotation::union([Annotation::User, Annotation::Member]);
    /// assert_eq!(users.option_kind(), Some(OptionKind::User));
    ///
    /// assert_eq!(Annotation::Other("Duration".into()).option_kind(), None);
    /// ```
    pub fn option_kind(&self) -> Option<OptionKind> {
        match self.strip_optional() {
            Self::Kind(kind) => Some(*kind),
            Self::Str => Some(OptionKind::String),
            Self::Int => Some(OptionKind::Integer),
            Self::Bool => Some(OptionKind::Boolean),
            Self::Float => Some(OptionKind::Number),
            Self::User | Self::Member => Some(OptionKind::User),
            Self::Channel(_) => Some(OptionKind::Channel),
            Self::Role => Some(OptionKind::Role),
            Self::Attachment => Some(OptionKind::Attachment),
            Self::Mentionable => Some(OptionKind::Mentionable),
            Self::Union(members) => union_kind(members),
            Self::Optional(_) | Self::Other(_) => None,
        }
    }

    /// Channel types implied by a channel annotation.
    ///
    /// A specific channel class yields its type; a union of specific classes
    /// yields all of them. Returns `None` when nothing narrows the channel.
    pub fn channel_types(&self) -> Option<Vec<ChannelType>> {
        let types: Vec<ChannelType> = match self.strip_optional() {
            Self::Channel(Some(channel_type)) => vec![*channel_type],
            Self::Union(members) => members
                .iter()
                .filter_map(|m| match m.strip_optional() {
                    Self::Channel(Some(channel_type)) => Some(*channel_type),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        (!types.is_empty()).then_some(types)
    }
}

fn union_kind(members: &[Annotation]) -> Option<OptionKind> {
    let members: Vec<&Annotation> = members.iter().map(Annotation::strip_optional).collect();
    match members.as_slice() {
        [] => None,
        [single] => single.option_kind(),
        _ => {
            let is_user = |a: &&Annotation| matches!(a, Annotation::User | Annotation::Member);
            let is_channel = |a: &&Annotation| matches!(a, Annotation::Channel(_));

            if members.iter().all(is_user) {
                Some(OptionKind::User)
            } else if members.iter().all(is_channel) {
                Some(OptionKind::Channel)
            } else if members
                .iter()
                .all(|a| is_user(a) || matches!(a, Annotation::Role))
                && members.iter().any(|a| matches!(a, Annotation::Role))
                && members.iter().any(is_user)
            {
                Some(OptionKind::Mentionable)
            } else {
                None
            }
        }
    }
}

/// Rust types that can be declared as option parameters.
pub trait OptionType {
    /// The annotation describing this type.
    fn annotation() -> Annotation;
}

impl OptionType for String {
    fn annotation() -> Annotation {
        Annotation::Str
    }
}

impl OptionType for &str {
    fn annotation() -> Annotation {
        Annotation::Str
    }
}

impl OptionType for bool {
    fn annotation() -> Annotation {
        Annotation::Bool
    }
}

macro_rules! option_type {
    ($annotation:expr => $($ty:ty),+) => {
        $(
            impl OptionType for $ty {
                fn annotation() -> Annotation {
                    $annotation
                }
            }
        )+
    };
}

option_type!(Annotation::Int => i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);
option_type!(Annotation::Float => f32, f64);

/// Any bound value. The option kind must come from a kind hint.
impl OptionType for OptionValue {
    fn annotation() -> Annotation {
        Annotation::Other("OptionValue".to_string())
    }
}

impl<T: OptionType> OptionType for Option<T> {
    fn annotation() -> Annotation {
        Annotation::optional(T::annotation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_is_unwrapped_for_kind() {
        let annotation = Annotation::optional(Annotation::Int);
        assert!(annotation.is_optional());
        assert_eq!(annotation.option_kind(), Some(OptionKind::Integer));
    }

    #[test]
    fn test_channel_union_resolves_types() {
        let annotation = Annotation::union([
            Annotation::Channel(Some(ChannelType::GuildText)),
            Annotation::Channel(Some(ChannelType::GuildVoice)),
        ]);
        assert_eq!(annotation.option_kind(), Some(OptionKind::Channel));
        assert_eq!(
            annotation.channel_types(),
            Some(vec![ChannelType::GuildText, ChannelType::GuildVoice])
        );
    }

    #[test]
    fn test_any_channel_has_no_channel_types() {
        assert_eq!(Annotation::Channel(None).channel_types(), None);
        assert_eq!(Annotation::Str.channel_types(), None);
    }

    #[test]
    fn test_mixed_union_is_unmapped() {
        let annotation = Annotation::union([Annotation::Str, Annotation::Int]);
        assert_eq!(annotation.option_kind(), None);
    }

    #[test]
    fn test_role_alone_in_union_is_role() {
        let annotation = Annotation::union([Annotation::optional(Annotation::Role)]);
        assert_eq!(annotation.option_kind(), Some(OptionKind::Role));
    }

    #[test]
    fn test_primitive_option_types() {
        assert_eq!(u16::annotation(), Annotation::Int);
        assert_eq!(f32::annotation(), Annotation::Float);
        assert_eq!(<&str>::annotation(), Annotation::Str);
        assert_eq!(
            Option::<bool>::annotation(),
            Annotation::Optional(Box::new(Annotation::Bool))
        );
    }
}
