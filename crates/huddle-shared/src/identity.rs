use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{GUEST_EMAIL, GUEST_ID_PREFIX, GUEST_USERNAME_PREFIX};
use crate::types::UserId;

/// The authenticated actor as seen by the rest of the application.
///
/// Messages and channels only keep the `id`; everything else is display
/// data owned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub is_guest: bool,
}

impl Identity {
    /// Identity for an e-mail login. The username is the local part.
    pub fn for_login(email: &str) -> Self {
        let username = email.split('@').next().unwrap_or_default().to_string();
        Self {
            id: UserId::generate(),
            email: email.to_string(),
            username,
            is_guest: false,
        }
    }

    /// Identity for a freshly registered account.
    pub fn registered(email: &str, username: &str) -> Self {
        Self {
            id: UserId::generate(),
            email: email.to_string(),
            username: username.to_string(),
            is_guest: false,
        }
    }

    /// Synthetic guest identity (`guest-<uuid>`, `Guest<n>` with n < 1000).
    pub fn guest() -> Self {
        let n: u16 = rand::thread_rng().gen_range(0..1000);
        Self {
            id: UserId(format!("{}{}", GUEST_ID_PREFIX, uuid::Uuid::new_v4())),
            email: GUEST_EMAIL.to_string(),
            username: format!("{GUEST_USERNAME_PREFIX}{n}"),
            is_guest: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_username_is_local_part() {
        let id = Identity::for_login("alice@example.org");
        assert_eq!(id.username, "alice");
        assert!(!id.is_guest);
    }

    #[test]
    fn guest_is_flagged_and_prefixed() {
        let g = Identity::guest();
        assert!(g.is_guest);
        assert!(g.id.as_str().starts_with(GUEST_ID_PREFIX));
        assert!(g.username.starts_with(GUEST_USERNAME_PREFIX));
        let n: u16 = g.username[GUEST_USERNAME_PREFIX.len()..].parse().unwrap();
        assert!(n < 1000);
    }

    #[test]
    fn serializes_camel_case() {
        let g = Identity::registered("bob@example.org", "bob");
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["isGuest"], false);
        assert_eq!(json["username"], "bob");
    }
}
