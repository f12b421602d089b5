//! Per-user profile records.
//!
//! Profiles are read straight from the store on every access, so any number
//! of `ProfileStore` clones stay consistent.  A user without a record gets a
//! placeholder that is only written once something changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use huddle_shared::constants::{StorageKeys, AVATAR_REF_SCHEME};
use huddle_shared::UserId;
use huddle_store::{JsonStore, Profile, ProfileUpdate};

use crate::error::ProfileError;

/// Persisted form: `{ profile, isLoading }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord {
    profile: Option<Profile>,
    #[serde(default)]
    is_loading: bool,
}

#[derive(Clone)]
pub struct ProfileStore {
    store: JsonStore,
    keys: StorageKeys,
}

impl ProfileStore {
    pub fn new(store: JsonStore, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// Persisted profile, or `None` if the user has never been updated.
    pub fn find(&self, user_id: &UserId) -> Result<Option<Profile>, ProfileError> {
        let record: Option<ProfileRecord> =
            self.store.load_or_discard(&self.keys.profile(user_id))?;
        Ok(record.and_then(|r| r.profile))
    }

    /// Persisted profile or a placeholder. The placeholder is not written.
    pub fn get(&self, user_id: &UserId) -> Result<Profile, ProfileError> {
        Ok(self
            .find(user_id)?
            .unwrap_or_else(|| Profile::placeholder(user_id)))
    }

    /// Merge `update` into the profile and persist it.
    pub fn update(&self, user_id: &UserId, update: ProfileUpdate) -> Result<Profile, ProfileError> {
        let mut profile = self.get(user_id)?;
        profile.apply(update);

        let record = ProfileRecord {
            profile: Some(profile.clone()),
            is_loading: false,
        };
        self.store.save(&self.keys.profile(user_id), &record)?;

        info!(user_id = %user_id, username = %profile.username, "profile updated");
        Ok(profile)
    }

    /// Read an image file and point the avatar at its content hash.
    pub async fn upload_avatar(&self, user_id: &UserId, file: &Path) -> Result<Profile, ProfileError> {
        let bytes = tokio::fs::read(file).await.map_err(|e| {
            ProfileError::Upload(format!("could not read '{}': {e}", file.display()))
        })?;

        if bytes.is_empty() {
            return Err(ProfileError::Upload(format!(
                "'{}' is empty",
                file.display()
            )));
        }

        let reference = format!("{AVATAR_REF_SCHEME}{}", blake3::hash(&bytes).to_hex());
        tracing::debug!(user_id = %user_id, size = bytes.len(), reference = %reference, "avatar read");

        self.update(
            user_id,
            ProfileUpdate {
                avatar_url: Some(Some(reference)),
                ..Default::default()
            },
        )
    }

    pub fn set_online_status(&self, user_id: &UserId, is_online: bool) -> Result<Profile, ProfileError> {
        self.update(
            user_id,
            ProfileUpdate {
                is_online: Some(is_online),
                ..Default::default()
            },
        )
    }

    pub fn set_status(&self, user_id: &UserId, status: &str) -> Result<Profile, ProfileError> {
        self.update(
            user_id,
            ProfileUpdate {
                status: Some(status.to_string()),
                ..Default::default()
            },
        )
    }
}
