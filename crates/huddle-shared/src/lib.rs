//! # huddle-shared
//!
//! Identifier newtypes, the actor [`Identity`](identity::Identity) and the
//! constants shared by the store and client crates.

pub mod constants;
pub mod identity;
pub mod types;

pub use identity::Identity;
pub use types::{ChannelId, Mention, MessageId, UserId};
