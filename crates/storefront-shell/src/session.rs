//! # Session Scope
//!
//! Holds the viewer's authentication state and notifies subscribers when it
//! changes.
//!
//! ## Change Notification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   sign_in() / sign_out()                                                │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   watch::Sender<ViewerState> ──► Shell re-guards the current location   │
//! │                              ──► CartScope reads the owning identity    │
//! │                                                                         │
//! │   snapshot() is always consistent with the latest send                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guards read the snapshot at evaluation time; they never cache it.

use std::sync::Arc;

use chrono::Utc;
use storefront_core::validation::validate_user_id;
use storefront_core::{Identity, ViewerState};
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::error::ShellResult;

/// The authentication scope. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<ViewerState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates an anonymous session.
    pub fn new() -> Self {
        let (state, _) = watch::channel(ViewerState::anonymous());
        SessionStore {
            state: Arc::new(state),
        }
    }

    /// Current viewer state.
    pub fn snapshot(&self) -> ViewerState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// Signs a viewer in and notifies subscribers.
    ///
    /// Replaces any existing identity. `display_name` defaults to `user_id`.
    pub fn sign_in(&self, user_id: &str, display_name: Option<&str>) -> ShellResult<Identity> {
        validate_user_id(user_id)?;
        let user_id = user_id.trim();

        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(user_id);

        let identity = Identity {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            session_id: Uuid::new_v4().to_string(),
            signed_in_at: Utc::now(),
        };

        info!(user_id = %identity.user_id, session_id = %identity.session_id, "Viewer signed in");
        self.state.send_replace(ViewerState::signed_in(identity.clone()));
        Ok(identity)
    }

    /// Signs the viewer out. Returns the identity that was cleared, if any.
    pub fn sign_out(&self) -> Option<Identity> {
        let previous = self.state.send_replace(ViewerState::anonymous());
        let identity = previous.identity().cloned();
        if let Some(ref identity) = identity {
            info!(user_id = %identity.user_id, "Viewer signed out");
        }
        identity
    }

    /// Receives every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewerState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellError;
    use storefront_core::ValidationError;

    #[test]
    fn test_starts_anonymous() {
        let session = SessionStore::new();
        assert!(!session.is_authenticated());
        assert!(session.current_identity().is_none());
    }

    #[test]
    fn test_sign_in_and_out() {
        let session = SessionStore::new();
        let identity = session.sign_in("ada", Some("Ada Lovelace")).unwrap();
        assert_eq!(identity.display_name, "Ada Lovelace");
        assert!(Uuid::parse_str(&identity.session_id).is_ok());
        assert!(session.is_authenticated());

        let cleared = session.sign_out().unwrap();
        assert_eq!(cleared.user_id, "ada");
        assert!(!session.is_authenticated());
        assert!(session.sign_out().is_none());
    }

    #[test]
    fn test_display_name_defaults_to_user_id() {
        let session = SessionStore::new();
        let identity = session.sign_in("  grace ", Some("  ")).unwrap();
        assert_eq!(identity.user_id, "grace");
        assert_eq!(identity.display_name, "grace");
    }

    #[test]
    fn test_empty_user_rejected() {
        let session = SessionStore::new();
        let err = session.sign_in("   ", None).unwrap_err();
        assert!(matches!(err, ShellError::SignIn(ValidationError::Required { .. })));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let session = SessionStore::new();
        let mut rx = session.subscribe();
        let clone = session.clone();

        clone.sign_in("ada", None).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        clone.sign_out();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }
}
