//! Domain model structs persisted as JSON records.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so a record can be handed to a UI layer unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use huddle_shared::{ChannelId, Mention, MessageId, UserId};

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A named message container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    /// Unique across the workspace, compared case-insensitively.
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_favorite: bool,
    /// Member user ids, no duplicates, in join order.
    #[serde(default)]
    pub members: Vec<UserId>,
    /// Pinned message ids, in pin order. Each references a message of this
    /// channel.
    #[serde(default)]
    pub pinned_messages: Vec<MessageId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Channel {
    pub fn has_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    /// Add `user` to the member set. Returns `false` if already present.
    pub fn add_member(&mut self, user: &UserId) -> bool {
        if self.has_member(user) {
            return false;
        }
        self.members.push(user.clone());
        true
    }

    /// Remove `user` from the member set. Returns `false` if absent.
    pub fn remove_member(&mut self, user: &UserId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != user);
        self.members.len() != before
    }

    pub fn is_pinned(&self, message: &MessageId) -> bool {
        self.pinned_messages.contains(message)
    }

    /// Pin `message` if unpinned, unpin it otherwise. Returns the new state.
    pub fn toggle_pin(&mut self, message: &MessageId) -> bool {
        if self.is_pinned(message) {
            self.pinned_messages.retain(|m| m != message);
            false
        } else {
            self.pinned_messages.push(message.clone());
            true
        }
    }

    /// Apply a partial update. Identity and provenance fields are not
    /// reachable through [`ChannelUpdate`].
    pub fn apply(&mut self, update: ChannelUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(is_private) = update.is_private {
            self.is_private = is_private;
        }
        if let Some(is_archived) = update.is_archived {
            self.is_archived = is_archived;
        }
        if let Some(is_favorite) = update.is_favorite {
            self.is_favorite = is_favorite;
        }
    }
}

/// Fields of a [`Channel`] that may be changed after creation. `None` leaves
/// the field as is; `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelUpdate {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_private: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_favorite: Option<bool>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// One prior state of a message body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    pub text: String,
    pub edited_at: DateTime<Utc>,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    /// Author display name at send time.
    pub user: String,
    /// Author identity; the only field authorization looks at.
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_edited: bool,
    /// Previous bodies, oldest first.
    #[serde(default)]
    pub edit_history: Vec<EditRecord>,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

impl Message {
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }

    /// Replace the body, logging the previous one first.
    pub fn apply_edit(&mut self, new_text: String, at: DateTime<Utc>) {
        let previous = std::mem::replace(&mut self.text, new_text);
        self.edit_history.push(EditRecord {
            text: previous,
            edited_at: at,
        });
        self.is_edited = true;
    }

    /// Case-insensitive substring match on the body or any mention.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
            || self
                .mentions
                .iter()
                .any(|m| m.as_str().to_lowercase().contains(needle))
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Per-user display metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_online: bool,
}

impl Profile {
    /// Default profile for a user seen for the first time.
    pub fn placeholder(id: &UserId) -> Self {
        Self {
            id: id.clone(),
            username: format!("user-{}", id.short()),
            avatar_url: None,
            status: String::new(),
            is_online: true,
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(avatar_url) = update.avatar_url {
            self.avatar_url = avatar_url;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(is_online) = update.is_online {
            self.is_online = is_online;
        }
    }
}

/// Partial profile update; only `Some` fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub avatar_url: Option<Option<String>>,
    pub status: Option<String>,
    pub is_online: Option<bool>,
}
