/// Default prefix for every persisted key
pub const DEFAULT_KEY_PREFIX: &str = "slack-clone";

/// Channel display-name bounds, in characters (inclusive)
pub const CHANNEL_NAME_MIN: usize = 2;
pub const CHANNEL_NAME_MAX: usize = 80;

/// Broadcast mention sentinel
pub const CHANNEL_MENTION: &str = "channel";

/// Author name used when neither a profile nor an identity has one
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Seed data for a fresh workspace
pub const SYSTEM_USER_ID: &str = "system";
pub const SYSTEM_AUTHOR: &str = "System";
pub const DEFAULT_CHANNEL: &str = "general";
pub const SEED_CHANNELS: [&str; 3] = ["general", "random", "help"];
pub const WELCOME_MESSAGE_ID: &str = "1";
pub const WELCOME_TEXT: &str = "Welcome to the channel! 👋";

/// Guest accounts
pub const GUEST_EMAIL: &str = "guest@example.com";
pub const GUEST_ID_PREFIX: &str = "guest-";
pub const GUEST_USERNAME_PREFIX: &str = "Guest";

/// Avatar references produced by the profile store
pub const AVATAR_REF_SCHEME: &str = "blob:";

/// Names of the persisted records, derived from a configurable prefix.
///
/// Layout: `<prefix>-messages`, `<prefix>-channels`,
/// `<prefix>-current-channel`, `<prefix>-auth`, `<prefix>-profile-<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    prefix: String,
}

impl StorageKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn messages(&self) -> String {
        format!("{}-messages", self.prefix)
    }

    pub fn channels(&self) -> String {
        format!("{}-channels", self.prefix)
    }

    pub fn current_channel(&self) -> String {
        format!("{}-current-channel", self.prefix)
    }

    pub fn auth(&self) -> String {
        format!("{}-auth", self.prefix)
    }

    pub fn profile(&self, user_id: &crate::types::UserId) -> String {
        format!("{}-profile-{}", self.prefix, user_id)
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}
