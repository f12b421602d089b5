use serde::Serialize;
use tokio::sync::broadcast;

use huddle_shared::{ChannelId, Mention, MessageId};

/// Buffered events per subscriber before the slowest one starts lagging.
pub const EVENT_BUFFER: usize = 256;

/// Change notifications for the presentation layer. Each one is sent after
/// the state change has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkspaceEvent {
    MessageSent {
        channel_id: ChannelId,
        message_id: MessageId,
    },
    MessageEdited {
        message_id: MessageId,
    },
    MessageDeleted {
        channel_id: ChannelId,
        message_id: MessageId,
    },
    ChannelCreated {
        channel_id: ChannelId,
    },
    ChannelUpdated {
        channel_id: ChannelId,
    },
    PinToggled {
        channel_id: ChannelId,
        message_id: MessageId,
        pinned: bool,
    },
    MentionAdded {
        message_id: MessageId,
        mention: Mention,
    },
    CurrentChannelChanged {
        channel_id: ChannelId,
    },
}

pub fn emit_event(tx: &broadcast::Sender<WorkspaceEvent>, event: WorkspaceEvent) {
    // No receivers is the normal headless case.
    if tx.send(event).is_err() {
        tracing::trace!("workspace event dropped: no subscribers");
    }
}
