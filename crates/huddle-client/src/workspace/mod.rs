//! The workspace state container.
//!
//! [`Workspace`] owns every channel and message, validates each command
//! against the current actor, commits the change in memory and then writes
//! the affected collections back to the store before returning.
//!
//! Commands are split by domain:
//! - [`messages`]: send, edit, delete, pins, mentions, search
//! - [`channels`]: create, update, archive, favorite, membership, navigation

mod channels;
mod messages;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;

use huddle_shared::constants::{
    StorageKeys, ANONYMOUS_AUTHOR, DEFAULT_CHANNEL, SEED_CHANNELS, SYSTEM_AUTHOR, SYSTEM_USER_ID,
    WELCOME_MESSAGE_ID, WELCOME_TEXT,
};
use huddle_shared::{ChannelId, Identity, MessageId, UserId};
use huddle_store::{Channel, JsonStore, Message};

use crate::auth::IdentityProvider;
use crate::error::WorkspaceError;
use crate::events::{emit_event, WorkspaceEvent, EVENT_BUFFER};
use crate::profile::ProfileStore;

pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// A channel plus the counts a sidebar needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOverview {
    #[serde(flatten)]
    pub channel: Channel,
    pub message_count: usize,
    pub pinned_count: usize,
    pub is_current: bool,
}

pub struct Workspace {
    store: JsonStore,
    keys: StorageKeys,
    identity: Arc<dyn IdentityProvider>,
    profiles: ProfileStore,
    messages: Vec<Message>,
    channels: Vec<Channel>,
    current_channel: ChannelId,
    events: broadcast::Sender<WorkspaceEvent>,
}

impl Workspace {
    /// Restore the workspace from the store, seeding whatever is missing.
    pub fn load(
        store: JsonStore,
        keys: StorageKeys,
        identity: Arc<dyn IdentityProvider>,
        profiles: ProfileStore,
    ) -> Result<Self> {
        let stored_messages: Option<Vec<Message>> = store.load_or_discard(&keys.messages())?;
        let stored_channels: Option<Vec<Channel>> = store.load_or_discard(&keys.channels())?;
        let current_channel: ChannelId = store
            .load_or_discard(&keys.current_channel())?
            .unwrap_or_else(|| ChannelId::from(DEFAULT_CHANNEL));

        let seed_messages = stored_messages.is_none();
        let seed_channels = stored_channels.is_none();

        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let workspace = Self {
            messages: stored_messages.unwrap_or_else(seed_messages_list),
            channels: stored_channels.unwrap_or_else(seed_channels_list),
            store,
            keys,
            identity,
            profiles,
            current_channel,
            events,
        };

        if seed_messages {
            workspace.persist_messages()?;
        }
        if seed_channels {
            workspace.persist_channels()?;
        }

        tracing::info!(
            channels = workspace.channels.len(),
            messages = workspace.messages.len(),
            current = %workspace.current_channel,
            seeded = seed_messages || seed_channels,
            "workspace loaded"
        );

        Ok(workspace)
    }

    // ------------------------------------------------------------------
    // Read projections
    // ------------------------------------------------------------------

    /// Messages of the current channel, in insertion order.
    pub fn messages(&self) -> Vec<&Message> {
        self.messages_in(&self.current_channel)
    }

    /// Messages of `channel_id`, in insertion order.
    pub fn messages_in(&self, channel_id: &ChannelId) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| &m.channel_id == channel_id)
            .collect()
    }

    pub fn all_messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, id: &ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| &c.id == id)
    }

    pub fn current_channel(&self) -> &ChannelId {
        &self.current_channel
    }

    /// Channel list for navigation: favorites first, archived last,
    /// otherwise creation order.
    pub fn channel_overviews(&self) -> Vec<ChannelOverview> {
        let mut overviews: Vec<ChannelOverview> = self
            .channels
            .iter()
            .map(|c| ChannelOverview {
                channel: c.clone(),
                message_count: self.messages.iter().filter(|m| m.channel_id == c.id).count(),
                pinned_count: c.pinned_messages.len(),
                is_current: c.id == self.current_channel,
            })
            .collect();

        overviews.sort_by_key(|o| (o.channel.is_archived, !o.channel.is_favorite));
        overviews
    }

    /// Receive a [`WorkspaceEvent`] for every committed change.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkspaceEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // Internals shared by the command modules
    // ------------------------------------------------------------------

    fn actor(&self) -> Result<Identity> {
        self.identity
            .current_identity()
            .ok_or_else(|| WorkspaceError::Unauthorized("sign in required".to_string()))
    }

    /// Profile username, else identity username, else "Anonymous".
    fn author_name(&self, actor: &Identity) -> String {
        let profile_name = match self.profiles.find(&actor.id) {
            Ok(profile) => profile.map(|p| p.username),
            Err(e) => {
                tracing::warn!(user_id = %actor.id, error = %e, "profile lookup failed");
                None
            }
        };

        profile_name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| Some(actor.username.clone()).filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string())
    }

    fn persist_messages(&self) -> Result<()> {
        self.store.save(&self.keys.messages(), &self.messages)?;
        Ok(())
    }

    fn persist_channels(&self) -> Result<()> {
        self.store.save(&self.keys.channels(), &self.channels)?;
        Ok(())
    }

    /// Write the candidate collections through, then adopt them. The
    /// message collection is always rewritten; channels only when given.
    /// On a failed write the in-memory state is left as it was.
    fn commit(&mut self, messages: Vec<Message>, channels: Option<Vec<Channel>>) -> Result<()> {
        if let Some(channels) = &channels {
            self.store.save(&self.keys.channels(), channels)?;
        }
        self.store.save(&self.keys.messages(), &messages)?;

        self.messages = messages;
        if let Some(channels) = channels {
            self.channels = channels;
        }
        Ok(())
    }

    fn emit(&self, event: WorkspaceEvent) {
        emit_event(&self.events, event);
    }
}

fn seed_channels_list() -> Vec<Channel> {
    let now = Utc::now();
    SEED_CHANNELS
        .iter()
        .map(|name| Channel {
            id: ChannelId::from(*name),
            name: name.to_string(),
            display_name: name.to_string(),
            description: None,
            is_private: false,
            is_archived: false,
            is_favorite: false,
            members: Vec::new(),
            pinned_messages: Vec::new(),
            created_by: UserId::from(SYSTEM_USER_ID),
            created_at: now,
        })
        .collect()
}

fn seed_messages_list() -> Vec<Message> {
    vec![Message {
        id: MessageId::from(WELCOME_MESSAGE_ID),
        text: WELCOME_TEXT.to_string(),
        user: SYSTEM_AUTHOR.to_string(),
        user_id: UserId::from(SYSTEM_USER_ID),
        channel_id: ChannelId::from(DEFAULT_CHANNEL),
        timestamp: Utc::now(),
        is_edited: false,
        edit_history: Vec::new(),
        mentions: Vec::new(),
    }]
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use huddle_store::{KeyValueStore, MemoryStore};

    use super::test_support::Fixture;
    use super::*;

    #[test]
    fn fresh_workspace_is_seeded_and_persisted() {
        let fx = Fixture::new();
        let ws = &fx.workspace;

        let names: Vec<_> = ws.channels().iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, ["general", "random", "help"]);
        assert_eq!(ws.current_channel().as_str(), "general");

        let visible = ws.messages();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, WELCOME_TEXT);
        assert_eq!(visible[0].user, "System");

        assert!(fx.backend.get("slack-clone-messages").unwrap().is_some());
        assert!(fx.backend.get("slack-clone-channels").unwrap().is_some());
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_seed() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("slack-clone-messages", "{\"broken\":true}").unwrap();

        let fx = Fixture::with_backend(backend);
        assert_eq!(fx.workspace.all_messages().len(), 1);
    }

    #[test]
    fn snapshot_survives_reload() {
        let mut fx = Fixture::new();
        fx.workspace.send_message("persist me").unwrap();
        let channel = fx.workspace.create_channel("design", None, None).unwrap();
        fx.workspace.set_current_channel(channel.id.clone()).unwrap();

        let reloaded = fx.reload();
        assert_eq!(reloaded.all_messages(), fx.workspace.all_messages());
        assert_eq!(reloaded.channels(), fx.workspace.channels());
        assert_eq!(reloaded.current_channel(), &channel.id);
    }

    #[test]
    fn overviews_order_favorites_first_archived_last() {
        let mut fx = Fixture::new();
        let random = ChannelId::from("random");
        let help = ChannelId::from("help");

        fx.workspace.toggle_channel_favorite(&help).unwrap();
        fx.workspace.archive_channel(&random).unwrap();

        let order: Vec<_> = fx
            .workspace
            .channel_overviews()
            .into_iter()
            .map(|o| (o.channel.id.to_string(), o.message_count, o.is_current))
            .collect();
        assert_eq!(
            order,
            [
                ("help".to_string(), 0, false),
                ("general".to_string(), 1, true),
                ("random".to_string(), 0, false),
            ]
        );
    }

    #[test]
    fn author_name_prefers_profile_then_identity() {
        let mut fx = Fixture::new();

        let m = fx.workspace.send_message("one").unwrap();
        assert_eq!(m.user, "alice");

        fx.profiles
            .update(
                &fx.alice.id,
                huddle_store::ProfileUpdate {
                    username: Some("Alice L.".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let m = fx.workspace.send_message("two").unwrap();
        assert_eq!(m.user, "Alice L.");

        let nameless = Identity::registered("x@example.org", "");
        fx.actor.sign_in(&nameless);
        let m = fx.workspace.send_message("three").unwrap();
        assert_eq!(m.user, ANONYMOUS_AUTHOR);
    }
}
