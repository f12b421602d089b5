//! # huddle-client
//!
//! Client-side state for the Huddle chat workspace: the local identity
//! provider, per-user profiles and the workspace core that owns channels and
//! messages.  Everything is persisted through `huddle-store`; there is no
//! server.

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod profile;
pub mod state;
pub mod workspace;

use tracing_subscriber::{fmt, EnvFilter};

pub use auth::{AuthService, IdentityProvider};
pub use config::{ClientConfig, StorageBackend};
pub use error::{AuthError, ProfileError, StartupError, WorkspaceError};
pub use events::WorkspaceEvent;
pub use profile::ProfileStore;
pub use state::AppState;
pub use workspace::{ChannelOverview, Workspace};

/// Install the global `fmt` subscriber. `RUST_LOG` wins over the configured
/// filter. Calling this twice is harmless.
pub fn init_tracing(config: &ClientConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Starting Huddle client v{}", env!("CARGO_PKG_VERSION"));
    }
}
