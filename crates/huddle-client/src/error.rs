use thiserror::Error;

use huddle_shared::{ChannelId, MessageId};
use huddle_store::StoreError;

/// Failures of a workspace command. State is unchanged whenever one of
/// these is returned; a [`WorkspaceError::Store`] failure is raised before
/// the change is adopted in memory.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Only the author may modify message {0}")]
    NotAuthor(MessageId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("Channel not found: {0}")]
    ChannelNotFound(ChannelId),

    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),
}

impl WorkspaceError {
    /// True for both a missing actor and an actor who is not the author.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::NotAuthor(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MessageNotFound(_) | Self::ChannelNotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Avatar upload failed: {0}")]
    Upload(String),

    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// A newer auth request (or a logout) started before this one resolved.
    #[error("Request superseded by a newer one")]
    Superseded,

    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),
}

/// Failure while assembling the [`AppState`](crate::state::AppState).
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
}
