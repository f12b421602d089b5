use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::CHANNEL_MENTION;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Fresh random identifier (UUID v4, hyphenated).
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Opaque user identifier handed out by the identity provider.
    UserId
);

string_id!(
    /// Channel identifier. Seeded channels use their name (`general`),
    /// user-created ones a UUID.
    ChannelId
);

string_id!(
    /// Message identifier.
    MessageId
);

impl UserId {
    /// First eight characters, used for placeholder usernames.
    pub fn short(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

/// A tag on a message: either a user or the whole channel.
///
/// Stored as a plain string; `"channel"` is the broadcast sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mention {
    User(UserId),
    Channel,
}

impl Mention {
    pub fn as_str(&self) -> &str {
        match self {
            Mention::User(id) => id.as_str(),
            Mention::Channel => CHANNEL_MENTION,
        }
    }
}

impl From<String> for Mention {
    fn from(s: String) -> Self {
        if s == CHANNEL_MENTION {
            Mention::Channel
        } else {
            Mention::User(UserId(s))
        }
    }
}

impl From<Mention> for String {
    fn from(m: Mention) -> Self {
        match m {
            Mention::User(id) => id.0,
            Mention::Channel => CHANNEL_MENTION.to_string(),
        }
    }
}

impl From<UserId> for Mention {
    fn from(id: UserId) -> Self {
        Mention::from(id.0)
    }
}

impl std::fmt::Display for Mention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
