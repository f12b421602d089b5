use chrono::Utc;
use tracing::{debug, info};

use huddle_shared::{ChannelId, Mention, MessageId, UserId};
use huddle_store::{EditRecord, Message};

use super::{Result, Workspace};
use crate::error::WorkspaceError;
use crate::events::WorkspaceEvent;

impl Workspace {
    /// Post `text` to the current channel as the current actor.
    ///
    /// Blank text is accepted; screening input is the caller's job.
    pub fn send_message(&mut self, text: &str) -> Result<Message> {
        let actor = self.actor()?;

        let message = Message {
            id: MessageId::generate(),
            text: text.to_string(),
            user: self.author_name(&actor),
            user_id: actor.id.clone(),
            channel_id: self.current_channel.clone(),
            timestamp: Utc::now(),
            is_edited: false,
            edit_history: Vec::new(),
            mentions: Vec::new(),
        };

        let mut messages = self.messages.clone();
        messages.push(message.clone());
        self.commit(messages, None)?;

        info!(msg_id = %message.id, channel = %message.channel_id, user_id = %actor.id, "Message sent");
        self.emit(WorkspaceEvent::MessageSent {
            channel_id: message.channel_id.clone(),
            message_id: message.id.clone(),
        });
        Ok(message)
    }

    /// Replace the body of one of the actor's own messages. The previous
    /// body is appended to the edit history.
    pub fn edit_message(&mut self, id: &MessageId, new_text: &str) -> Result<Message> {
        let actor = self.actor()?;

        let index = self.message_index(id)?;
        if !self.messages[index].is_authored_by(&actor.id) {
            debug!(msg_id = %id, user_id = %actor.id, "edit refused: not the author");
            return Err(WorkspaceError::NotAuthor(id.clone()));
        }

        let mut messages = self.messages.clone();
        messages[index].apply_edit(new_text.to_string(), Utc::now());
        let updated = messages[index].clone();
        self.commit(messages, None)?;

        info!(msg_id = %id, revisions = updated.edit_history.len(), "Message edited");
        self.emit(WorkspaceEvent::MessageEdited {
            message_id: id.clone(),
        });
        Ok(updated)
    }

    /// Remove one of the actor's own messages, unpinning it first.
    pub fn delete_message(&mut self, id: &MessageId) -> Result<Message> {
        let actor = self.actor()?;

        let index = self.message_index(id)?;
        if !self.messages[index].is_authored_by(&actor.id) {
            debug!(msg_id = %id, user_id = %actor.id, "delete refused: not the author");
            return Err(WorkspaceError::NotAuthor(id.clone()));
        }

        let mut messages = self.messages.clone();
        let removed = messages.remove(index);

        let channels = self
            .channels
            .iter()
            .position(|c| c.id == removed.channel_id && c.is_pinned(id))
            .map(|pinned_in| {
                let mut channels = self.channels.clone();
                channels[pinned_in].pinned_messages.retain(|p| p != id);
                channels
            });
        let unpinned = channels.is_some();

        self.commit(messages, channels)?;

        info!(msg_id = %id, channel = %removed.channel_id, unpinned, "Message deleted");
        self.emit(WorkspaceEvent::MessageDeleted {
            channel_id: removed.channel_id.clone(),
            message_id: id.clone(),
        });
        Ok(removed)
    }

    /// Previous bodies of a message, oldest first. Empty for unknown ids.
    pub fn get_message_history(&self, id: &MessageId) -> Vec<EditRecord> {
        self.message(id)
            .map(|m| m.edit_history.clone())
            .unwrap_or_default()
    }

    /// Tag a message with a user (or `"channel"` for everyone). Repeated
    /// mentions are kept.
    pub fn add_mention(&mut self, message_id: &MessageId, user_id: &UserId) -> Result<Message> {
        self.actor()?;

        let index = self.message_index(message_id)?;

        let mention = Mention::from(user_id.clone());
        let mut messages = self.messages.clone();
        messages[index].mentions.push(mention.clone());
        let updated = messages[index].clone();
        self.commit(messages, None)?;

        info!(msg_id = %message_id, mention = %mention, "Mention added");
        self.emit(WorkspaceEvent::MentionAdded {
            message_id: message_id.clone(),
            mention,
        });
        Ok(updated)
    }

    /// Pin or unpin a message in its own channel. Returns `true` if the
    /// message is pinned afterwards.
    pub fn toggle_message_pin(&mut self, id: &MessageId) -> Result<bool> {
        self.actor()?;

        let channel_id = self
            .message(id)
            .map(|m| m.channel_id.clone())
            .ok_or_else(|| WorkspaceError::MessageNotFound(id.clone()))?;

        let index = self
            .channels
            .iter()
            .position(|c| c.id == channel_id)
            .ok_or_else(|| WorkspaceError::ChannelNotFound(channel_id.clone()))?;

        let mut channels = self.channels.clone();
        let pinned = channels[index].toggle_pin(id);
        self.commit(self.messages.clone(), Some(channels))?;

        info!(msg_id = %id, channel = %channel_id, pinned, "Pin toggled");
        self.emit(WorkspaceEvent::PinToggled {
            channel_id,
            message_id: id.clone(),
            pinned,
        });
        Ok(pinned)
    }

    /// Case-insensitive substring search over message bodies and mentions,
    /// optionally limited to one channel. Results keep insertion order.
    pub fn search_messages(&self, query: &str, channel_id: Option<&ChannelId>) -> Vec<&Message> {
        let needle = query.to_lowercase();

        self.messages
            .iter()
            .filter(|m| channel_id.map_or(true, |c| &m.channel_id == c))
            .filter(|m| m.matches(&needle))
            .collect()
    }

    fn message_index(&self, id: &MessageId) -> Result<usize> {
        self.messages
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| WorkspaceError::MessageNotFound(id.clone()))
    }

    /// Pinned messages of a channel, in the order they were posted.
    pub fn get_pinned_messages(&self, channel_id: &ChannelId) -> Vec<&Message> {
        let Some(channel) = self.channel(channel_id) else {
            return Vec::new();
        };

        self.messages
            .iter()
            .filter(|m| &m.channel_id == channel_id && channel.is_pinned(&m.id))
            .collect()
    }
}
