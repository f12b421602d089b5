//! Process-wide application context.
//!
//! [`AppState`] is built once at startup from the persisted snapshot and is
//! the only way the presentation layer reaches the workspace, profiles and
//! identity.  Hosts that dispatch commands from several tasks wrap it in
//! `Arc<Mutex<>>` via [`AppState::shared`].

use std::sync::{Arc, Mutex};

use huddle_shared::constants::StorageKeys;
use huddle_store::{Database, JsonStore, KeyValueStore, MemoryStore, Profile};

use crate::auth::{AuthService, IdentityProvider};
use crate::config::{ClientConfig, StorageBackend};
use crate::error::{ProfileError, StartupError};
use crate::profile::ProfileStore;
use crate::workspace::Workspace;

/// Central application state.
pub struct AppState {
    pub config: ClientConfig,

    /// Identity provider; also the workspace's source of the current actor.
    pub auth: Arc<AuthService>,

    pub profiles: ProfileStore,

    /// Channels and messages.
    pub workspace: Workspace,
}

impl AppState {
    /// Open the configured store and restore every component from it.
    pub fn bootstrap(config: ClientConfig) -> Result<Self, StartupError> {
        let backend = open_backend(&config)?;
        Self::with_backend(config, backend)
    }

    /// Like [`bootstrap`](Self::bootstrap) with an explicit backend.
    pub fn with_backend(
        config: ClientConfig,
        backend: Arc<dyn KeyValueStore>,
    ) -> Result<Self, StartupError> {
        let store = JsonStore::new(backend);
        let keys = StorageKeys::new(config.key_prefix.clone());

        let auth = Arc::new(AuthService::load(store.clone(), keys.clone())?);
        let profiles = ProfileStore::new(store.clone(), keys.clone());
        let workspace = Workspace::load(store, keys, auth.clone(), profiles.clone())?;

        Ok(Self {
            config,
            auth,
            profiles,
            workspace,
        })
    }

    /// Profile of the signed-in user, or `None` when signed out.
    pub fn current_profile(&self) -> Result<Option<Profile>, ProfileError> {
        match self.auth.current_identity() {
            Some(identity) => self.profiles.get(&identity.id).map(Some),
            None => Ok(None),
        }
    }

    pub fn shared(self) -> Arc<Mutex<AppState>> {
        Arc::new(Mutex::new(self))
    }
}

fn open_backend(config: &ClientConfig) -> Result<Arc<dyn KeyValueStore>, StartupError> {
    let backend: Arc<dyn KeyValueStore> = match config.storage {
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Sqlite => match config.data_dir.as_deref() {
            Some(dir) => Arc::new(Database::open_in_dir(dir)?),
            None => Arc::new(Database::new()?),
        },
    };
    Ok(backend)
}
