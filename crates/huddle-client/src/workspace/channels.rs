use chrono::Utc;
use tracing::info;

use huddle_shared::constants::{CHANNEL_NAME_MAX, CHANNEL_NAME_MIN};
use huddle_shared::ChannelId;
use huddle_store::{Channel, ChannelUpdate};

use super::{Result, Workspace};
use crate::error::WorkspaceError;
use crate::events::WorkspaceEvent;

impl Workspace {
    /// Create a channel owned by the current actor, who becomes its only
    /// member.
    pub fn create_channel(
        &mut self,
        display_name: &str,
        description: Option<&str>,
        is_private: Option<bool>,
    ) -> Result<Channel> {
        let actor = self.actor()?;
        self.validate_display_name(display_name, None)?;

        let channel = Channel {
            id: ChannelId::generate(),
            name: display_name.to_string(),
            display_name: display_name.to_string(),
            description: description.map(str::to_string),
            is_private: is_private.unwrap_or(false),
            is_archived: false,
            is_favorite: false,
            members: vec![actor.id.clone()],
            pinned_messages: Vec::new(),
            created_by: actor.id.clone(),
            created_at: Utc::now(),
        };

        let mut channels = self.channels.clone();
        channels.push(channel.clone());
        self.commit(self.messages.clone(), Some(channels))?;

        info!(channel_id = %channel.id, name = %channel.display_name, private = channel.is_private, "Channel created");
        self.emit(WorkspaceEvent::ChannelCreated {
            channel_id: channel.id.clone(),
        });
        Ok(channel)
    }

    /// Merge `update` into a channel. Any signed-in actor may do this; a new
    /// display name is held to the same rules as at creation.
    pub fn update_channel(&mut self, id: &ChannelId, update: ChannelUpdate) -> Result<Channel> {
        self.actor()?;

        if self.channel(id).is_none() {
            return Err(WorkspaceError::ChannelNotFound(id.clone()));
        }
        if let Some(display_name) = update.display_name.as_deref() {
            self.validate_display_name(display_name, Some(id))?;
        }

        self.modify_channel(id, |channel| channel.apply(update))
    }

    pub fn archive_channel(&mut self, id: &ChannelId) -> Result<Channel> {
        self.update_channel(
            id,
            ChannelUpdate {
                is_archived: Some(true),
                ..Default::default()
            },
        )
    }

    pub fn toggle_channel_favorite(&mut self, id: &ChannelId) -> Result<Channel> {
        self.actor()?;
        self.modify_channel(id, |channel| channel.is_favorite = !channel.is_favorite)
    }

    /// Add the current actor to a channel's members. Joining twice is a no-op.
    pub fn join_channel(&mut self, id: &ChannelId) -> Result<Channel> {
        let actor = self.actor()?;
        self.modify_channel(id, |channel| {
            channel.add_member(&actor.id);
        })
    }

    /// Remove the current actor from a channel's members.
    pub fn leave_channel(&mut self, id: &ChannelId) -> Result<Channel> {
        let actor = self.actor()?;
        self.modify_channel(id, |channel| {
            channel.remove_member(&actor.id);
        })
    }

    /// Point the message projection at another channel. The id is not
    /// checked against the channel list.
    pub fn set_current_channel(&mut self, channel_id: ChannelId) -> Result<()> {
        if self.current_channel == channel_id {
            return Ok(());
        }

        self.store.save(&self.keys.current_channel(), &channel_id)?;
        self.current_channel = channel_id;

        tracing::debug!(channel = %self.current_channel, "current channel changed");
        self.emit(WorkspaceEvent::CurrentChannelChanged {
            channel_id: self.current_channel.clone(),
        });
        Ok(())
    }

    fn modify_channel<F>(&mut self, id: &ChannelId, f: F) -> Result<Channel>
    where
        F: FnOnce(&mut Channel),
    {
        let index = self
            .channels
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| WorkspaceError::ChannelNotFound(id.clone()))?;

        let mut channels = self.channels.clone();
        f(&mut channels[index]);
        let updated = channels[index].clone();
        self.commit(self.messages.clone(), Some(channels))?;

        info!(
            channel_id = %id,
            archived = updated.is_archived,
            favorite = updated.is_favorite,
            members = updated.members.len(),
            "Channel updated"
        );
        self.emit(WorkspaceEvent::ChannelUpdated {
            channel_id: id.clone(),
        });
        Ok(updated)
    }

    /// Length within bounds and no other channel (besides `except`) with the
    /// same name ignoring case. Length is measured in UTF-16 code units, so
    /// an emoji outside the BMP counts twice.
    fn validate_display_name(&self, name: &str, except: Option<&ChannelId>) -> Result<()> {
        let len = name.encode_utf16().count();
        if !(CHANNEL_NAME_MIN..=CHANNEL_NAME_MAX).contains(&len) {
            return Err(WorkspaceError::Validation(format!(
                "channel name must be {CHANNEL_NAME_MIN} to {CHANNEL_NAME_MAX} units long, got {len}"
            )));
        }

        let wanted = name.to_lowercase();
        let taken = self
            .channels
            .iter()
            .filter(|c| except != Some(&c.id))
            .any(|c| c.display_name.to_lowercase() == wanted);
        if taken {
            return Err(WorkspaceError::Validation(format!(
                "channel name '{name}' is already in use"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{flaky_workspace, Fixture};
    use super::*;

    #[test]
    fn duplicate_name_differing_in_case_is_rejected() {
        let mut fx = Fixture::new();
        fx.workspace
            .update_channel(
                &ChannelId::from("general"),
                ChannelUpdate {
                    display_name: Some("General".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let before = fx.workspace.channels().len();

        let err = fx.workspace.create_channel("general", None, None).unwrap_err();
        assert!(matches!(err, WorkspaceError::Validation(_)));
        assert_eq!(fx.workspace.channels().len(), before);
    }

    #[test]
    fn duplicate_detection_is_order_independent() {
        let mut fx = Fixture::new();
        fx.workspace.create_channel("Release-Train", None, None).unwrap();
        assert!(fx.workspace.create_channel("release-train", None, None).is_err());
        assert!(fx.workspace.create_channel("RELEASE-TRAIN", None, None).is_err());

        fx.workspace.create_channel("ops", None, None).unwrap();
        assert!(fx.workspace.create_channel("OPS", None, None).is_err());
    }

    #[test]
    fn name_length_bounds() {
        let mut fx = Fixture::new();

        let too_long = "a".repeat(81);
        for bad in ["", "x", too_long.as_str()] {
            assert!(
                matches!(
                    fx.workspace.create_channel(bad, None, None),
                    Err(WorkspaceError::Validation(_))
                ),
                "{bad:?} should be rejected"
            );
        }

        fx.workspace.create_channel("ab", None, None).unwrap();
        fx.workspace.create_channel(&"b".repeat(80), None, None).unwrap();
        // 80 multi-byte characters still fit
        fx.workspace.create_channel(&"é".repeat(80), None, None).unwrap();
    }

    #[test]
    fn whitespace_name_is_accepted() {
        let mut fx = Fixture::new();
        let c = fx.workspace.create_channel("  ", None, None).unwrap();
        assert_eq!(c.display_name, "  ");
        assert!(fx.workspace.create_channel("   ", None, None).is_ok());
    }

    #[test]
    fn astral_characters_count_as_two_units() {
        let mut fx = Fixture::new();

        // a single emoji is two UTF-16 units
        fx.workspace.create_channel("\u{1F600}", None, None).unwrap();
        fx.workspace
            .create_channel(&"\u{1F389}".repeat(40), None, None)
            .unwrap();

        let err = fx
            .workspace
            .create_channel(&"\u{1F680}".repeat(41), None, None)
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::Validation(_)));
    }

    #[test]
    fn failed_write_leaves_channels_untouched() {
        let (mut workspace, store, _actor) = flaky_workspace();
        let mut events = workspace.subscribe();
        let before = workspace.channels().to_vec();

        store.fail_writes(true);
        assert!(matches!(
            workspace.create_channel("design", None, None),
            Err(WorkspaceError::Store(_))
        ));
        assert!(workspace
            .toggle_channel_favorite(&ChannelId::from("help"))
            .is_err());
        assert!(workspace
            .set_current_channel(ChannelId::from("random"))
            .is_err());

        assert_eq!(workspace.channels(), &before[..]);
        assert_eq!(workspace.current_channel().as_str(), "general");
        assert!(events.try_recv().is_err());

        store.fail_writes(false);
        workspace.create_channel("design", None, None).unwrap();
        assert!(events.try_recv().is_ok());
    }

    #[test]
    fn created_channel_defaults() {
        let mut fx = Fixture::new();
        let c = fx
            .workspace
            .create_channel("design", Some("mockups"), Some(true))
            .unwrap();

        assert_eq!(c.members, vec![fx.alice.id.clone()]);
        assert_eq!(c.created_by, fx.alice.id);
        assert_eq!(c.description.as_deref(), Some("mockups"));
        assert!(c.is_private);
        assert!(!c.is_archived);
        assert!(!c.is_favorite);
        assert!(c.pinned_messages.is_empty());
        assert_eq!(fx.workspace.channel(&c.id), Some(&c));
    }

    #[test]
    fn create_requires_actor() {
        let mut fx = Fixture::new();
        fx.actor.sign_out();
        assert!(matches!(
            fx.workspace.create_channel("design", None, None),
            Err(WorkspaceError::Unauthorized(_))
        ));
        assert_eq!(fx.workspace.channels().len(), 3);
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let mut fx = Fixture::new();
        let c = fx.workspace.create_channel("design", Some("old"), None).unwrap();

        fx.actor.sign_in(&fx.bob);
        let updated = fx
            .workspace
            .update_channel(
                &c.id,
                ChannelUpdate {
                    description: Some(Some("new".into())),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.description.as_deref(), Some("new"));
        assert_eq!(updated.display_name, "design");
        assert_eq!(updated.created_by, fx.alice.id);
        assert_eq!(updated.created_at, c.created_at);
    }

    #[test]
    fn rename_cannot_collide_but_may_change_case() {
        let mut fx = Fixture::new();
        let random = ChannelId::from("random");

        let collide = fx.workspace.update_channel(
            &random,
            ChannelUpdate {
                display_name: Some("HELP".into()),
                ..Default::default()
            },
        );
        assert!(matches!(collide, Err(WorkspaceError::Validation(_))));

        let recased = fx
            .workspace
            .update_channel(
                &random,
                ChannelUpdate {
                    display_name: Some("Random".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(recased.display_name, "Random");
    }

    #[test]
    fn archive_and_favorite() {
        let mut fx = Fixture::new();
        let help = ChannelId::from("help");

        assert!(fx.workspace.archive_channel(&help).unwrap().is_archived);
        assert!(fx.workspace.toggle_channel_favorite(&help).unwrap().is_favorite);
        assert!(!fx.workspace.toggle_channel_favorite(&help).unwrap().is_favorite);

        let missing = ChannelId::from("missing");
        assert!(fx.workspace.archive_channel(&missing).unwrap_err().is_not_found());
        assert!(fx
            .workspace
            .toggle_channel_favorite(&missing)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn join_and_leave() {
        let mut fx = Fixture::new();
        let c = fx.workspace.create_channel("design", None, None).unwrap();

        fx.actor.sign_in(&fx.bob);
        fx.workspace.join_channel(&c.id).unwrap();
        let joined = fx.workspace.join_channel(&c.id).unwrap();
        assert_eq!(joined.members, vec![fx.alice.id.clone(), fx.bob.id.clone()]);

        let left = fx.workspace.leave_channel(&c.id).unwrap();
        assert_eq!(left.members, vec![fx.alice.id.clone()]);
    }

    #[test]
    fn current_channel_is_unchecked_pointer() {
        let mut fx = Fixture::new();
        fx.actor.sign_out();

        fx.workspace
            .set_current_channel(ChannelId::from("does-not-exist"))
            .unwrap();
        assert_eq!(fx.workspace.current_channel().as_str(), "does-not-exist");
        assert!(fx.workspace.messages().is_empty());
    }
}
