//! Entity reference types for parameters that name users, roles, channels
//! and attachments.
//!
//! Each type wraps the entity's [`Snowflake`] and maps to its protocol
//! option kind. Channel classes narrow a channel option to one channel type.

use crate::annotation::{Annotation, OptionType};
use crate::bind::FromOptionValue;
use crate::types::{ChannelType, OptionValue, Snowflake};

macro_rules! entity_ref {
    ($(#[$meta:meta])* $name:ident, $annotation:expr, $($variant:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub Snowflake);

        impl OptionType for $name {
            fn annotation() -> Annotation {
                $annotation
            }
        }

        impl FromOptionValue for $name {
            fn from_value(value: &OptionValue) -> Option<Self> {
                match value {
                    $(OptionValue::$variant(id))|+ => Some($name(*id)),
                    _ => None,
                }
            }
        }
    };
}

entity_ref!(
    /// A user.
    User, Annotation::User, User
);
entity_ref!(
    /// A guild member.
    Member, Annotation::Member, User
);
entity_ref!(
    /// A guild role.
    Role, Annotation::Role, Role
);
entity_ref!(
    /// An uploaded file.
    Attachment, Annotation::Attachment, Attachment
);
entity_ref!(
    /// A user or a role.
    Mentionable, Annotation::Mentionable, Mentionable | User | Role
);
entity_ref!(
    /// Any channel.
    Channel, Annotation::Channel(None), Channel
);
entity_ref!(
    /// A guild text channel.
    TextChannel, Annotation::Channel(Some(ChannelType::GuildText)), Channel
);
entity_ref!(
    /// A guild voice channel.
    VoiceChannel, Annotation::Channel(Some(ChannelType::GuildVoice)), Channel
);
entity_ref!(
    /// A channel category.
    CategoryChannel, Annotation::Channel(Some(ChannelType::GuildCategory)), Channel
);
entity_ref!(
    /// An announcement channel.
    AnnouncementChannel, Annotation::Channel(Some(ChannelType::GuildAnnouncement)), Channel
);
entity_ref!(
    /// A stage channel.
    StageChannel, Annotation::Channel(Some(ChannelType::GuildStageVoice)), Channel
);
entity_ref!(
    /// A forum channel.
    ForumChannel, Annotation::Channel(Some(ChannelType::GuildForum)), Channel
);
entity_ref!(
    /// A public or private thread.
    ThreadChannel,
    Annotation::union([
        Annotation::Channel(Some(ChannelType::PublicThread)),
        Annotation::Channel(Some(ChannelType::PrivateThread)),
        Annotation::Channel(Some(ChannelType::AnnouncementThread)),
    ]),
    Channel
);
