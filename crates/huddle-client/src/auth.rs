//! Local identity provider.
//!
//! There is no backend: login and registration mint an [`Identity`] on the
//! spot and persist it until logout.  The operations are `async` so callers
//! treat them like remote requests, and every request carries a generation
//! ticket so that a request resolving after a newer one (or after a logout)
//! is discarded instead of overwriting the newer state.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::info;

use huddle_shared::constants::StorageKeys;
use huddle_shared::Identity;
use huddle_store::JsonStore;

use crate::error::AuthError;

/// Read access to the current actor, used for authorization checks.
pub trait IdentityProvider: Send + Sync {
    /// The authenticated identity, or `None` when signed out.
    fn current_identity(&self) -> Option<Identity>;
}

/// Persisted form: `{ identity, isAuthenticated }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthSnapshot {
    identity: Option<Identity>,
    is_authenticated: bool,
}

#[derive(Debug, Default)]
struct AuthInner {
    snapshot: AuthSnapshot,
    generation: u64,
    in_flight: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket(u64);

pub struct AuthService {
    store: JsonStore,
    keys: StorageKeys,
    inner: Mutex<AuthInner>,
}

impl AuthService {
    /// Restore the persisted session, if any.
    pub fn load(store: JsonStore, keys: StorageKeys) -> Result<Self, AuthError> {
        let snapshot: AuthSnapshot = store.load_or_discard(&keys.auth())?.unwrap_or_default();

        if let Some(identity) = snapshot.identity.as_ref().filter(|_| snapshot.is_authenticated) {
            info!(user_id = %identity.id, guest = identity.is_guest, "restored session");
        }

        Ok(Self {
            store,
            keys,
            inner: Mutex::new(AuthInner {
                snapshot,
                ..Default::default()
            }),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        validate_email(email)?;
        require_non_blank("password", password)?;

        let ticket = self.begin();
        tokio::task::yield_now().await;
        self.resolve(ticket, Identity::for_login(email.trim()))
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Identity, AuthError> {
        validate_email(email)?;
        require_non_blank("password", password)?;
        require_non_blank("username", username)?;

        let ticket = self.begin();
        tokio::task::yield_now().await;
        self.resolve(ticket, Identity::registered(email.trim(), username.trim()))
    }

    pub async fn guest_login(&self) -> Result<Identity, AuthError> {
        let ticket = self.begin();
        tokio::task::yield_now().await;
        self.resolve(ticket, Identity::guest())
    }

    /// Sign out and forget the persisted session. Any request still in
    /// flight is invalidated.
    pub fn logout(&self) -> Result<(), AuthError> {
        let previous = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.in_flight = None;
            std::mem::take(&mut inner.snapshot)
        };

        self.store.remove(&self.keys.auth())?;

        if let Some(identity) = previous.identity {
            info!(user_id = %identity.id, "logged out");
        }
        Ok(())
    }

    /// Acknowledge a password reset request. Nothing is sent anywhere.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        validate_email(email)?;
        tokio::task::yield_now().await;
        info!(email = %email.trim(), "password reset requested");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_identity().is_some()
    }

    /// Whether an auth request is currently awaiting resolution.
    pub fn is_loading(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, AuthInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Ticket {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.in_flight = Some(inner.generation);
        Ticket(inner.generation)
    }

    /// Adopt `identity` if `ticket` is still current. The session is written
    /// before it becomes visible, so a failed write leaves the caller signed
    /// out.
    fn resolve(&self, ticket: Ticket, identity: Identity) -> Result<Identity, AuthError> {
        let mut inner = self.lock();
        if inner.generation != ticket.0 {
            tracing::debug!(ticket = ticket.0, current = inner.generation, "stale auth result dropped");
            return Err(AuthError::Superseded);
        }
        inner.in_flight = None;

        let snapshot = AuthSnapshot {
            identity: Some(identity.clone()),
            is_authenticated: true,
        };
        self.store.save(&self.keys.auth(), &snapshot)?;
        inner.snapshot = snapshot;
        drop(inner);

        info!(user_id = %identity.id, username = %identity.username, guest = identity.is_guest, "signed in");
        Ok(identity)
    }
}

impl IdentityProvider for AuthService {
    fn current_identity(&self) -> Option<Identity> {
        let inner = self.lock();
        if inner.snapshot.is_authenticated {
            inner.snapshot.identity.clone()
        } else {
            None
        }
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::InvalidCredentials(format!(
            "'{email}' is not an e-mail address"
        ))),
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::InvalidCredentials(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use huddle_store::{KeyValueStore, MemoryStore};

    use super::*;
    use crate::workspace::test_support::FlakyStore;

    fn service() -> (AuthService, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let store = JsonStore::new(backend.clone());
        let auth = AuthService::load(store, StorageKeys::default()).unwrap();
        (auth, backend)
    }

    #[tokio::test]
    async fn login_persists_session() {
        let (auth, backend) = service();
        let identity = auth.login("alice@example.org", "secret").await.unwrap();

        assert_eq!(identity.username, "alice");
        assert_eq!(auth.current_identity(), Some(identity.clone()));
        assert!(!auth.is_loading());

        let reloaded =
            AuthService::load(JsonStore::new(backend.clone()), StorageKeys::default()).unwrap();
        assert_eq!(reloaded.current_identity(), Some(identity));
    }

    #[tokio::test]
    async fn logout_clears_persisted_session() {
        let (auth, backend) = service();
        auth.guest_login().await.unwrap();
        assert!(backend.get("slack-clone-auth").unwrap().is_some());

        auth.logout().unwrap();
        assert!(auth.current_identity().is_none());
        assert!(backend.get("slack-clone-auth").unwrap().is_none());
    }

    #[tokio::test]
    async fn register_keeps_chosen_username() {
        let (auth, _) = service();
        let identity = auth
            .register("carol@example.org", "pw", "  Carol ")
            .await
            .unwrap();
        assert_eq!(identity.username, "Carol");
        assert!(!identity.is_guest);
    }

    #[tokio::test]
    async fn bad_input_is_rejected_before_any_state_change() {
        let (auth, _) = service();
        assert!(matches!(
            auth.login("not-an-email", "pw").await,
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(matches!(
            auth.register("a@b.c", "pw", " ").await,
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(auth.reset_password("@nowhere").await.is_err());
        assert!(auth.reset_password("a@b.c").await.is_ok());
        assert!(auth.current_identity().is_none());
    }

    #[test]
    fn older_request_cannot_overwrite_newer_one() {
        let (auth, _) = service();
        let first = auth.begin();
        let second = auth.begin();
        assert!(auth.is_loading());

        let bob = Identity::for_login("bob@example.org");
        auth.resolve(second, bob.clone()).unwrap();

        let stale = auth.resolve(first, Identity::for_login("eve@example.org"));
        assert!(matches!(stale, Err(AuthError::Superseded)));
        assert_eq!(auth.current_identity(), Some(bob));
    }

    #[test]
    fn logout_invalidates_in_flight_login() {
        let (auth, backend) = service();
        let ticket = auth.begin();
        auth.logout().unwrap();
        assert!(!auth.is_loading());

        let late = auth.resolve(ticket, Identity::for_login("late@example.org"));
        assert!(matches!(late, Err(AuthError::Superseded)));
        assert!(auth.current_identity().is_none());
        assert!(backend.get("slack-clone-auth").unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_session_write_leaves_user_signed_out() {
        let backend = Arc::new(FlakyStore::default());
        let auth =
            AuthService::load(JsonStore::new(backend.clone()), StorageKeys::default()).unwrap();

        backend.fail_writes(true);
        assert!(matches!(
            auth.login("alice@example.org", "secret").await,
            Err(AuthError::Store(_))
        ));
        assert!(auth.current_identity().is_none());
        assert!(!auth.is_loading());
        assert!(backend.get("slack-clone-auth").unwrap().is_none());

        backend.fail_writes(false);
        let identity = auth.login("alice@example.org", "secret").await.unwrap();
        assert_eq!(auth.current_identity(), Some(identity));
    }
}
