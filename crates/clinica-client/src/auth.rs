//! Sign-in state and the admin gate.
//!
//! Authentication itself is the external provider's job; this module
//! only tracks the observable signed-in user and checks the `role` field
//! on the corresponding user record when an admin surface is entered.

use tokio::sync::watch;

use clinica_shared::{Role, UserId};
use clinica_store::models::UserProfile;
use clinica_store::{StoreClient, StorePath};

use crate::{ClientError, Result};

/// Current sign-in state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(UserId),
}

/// Observable sign-in state, one writer (the auth callback), any number
/// of watchers.
pub struct AuthSession {
    tx: watch::Sender<AuthState>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthState::SignedOut);
        Self { tx }
    }

    pub fn sign_in(&self, user: UserId) {
        let _ = self.tx.send(AuthState::SignedIn(user));
    }

    pub fn sign_out(&self) {
        let _ = self.tx.send(AuthState::SignedOut);
    }

    pub fn state(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    /// The signed-in user, or [`ClientError::SignedOut`].
    pub fn current_user(&self) -> Result<UserId> {
        match self.state() {
            AuthState::SignedIn(user) => Ok(user),
            AuthState::SignedOut => Err(ClientError::SignedOut),
        }
    }

    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Admin routes are gated on `users/{uid}/role == "admin"`.
pub async fn require_admin(store: &StoreClient, user: &UserId) -> Result<()> {
    let snapshot = store.read(&StorePath::user(user)?).await;
    let profile: UserProfile = snapshot.decode_or_default()?;
    match profile.role {
        Some(Role::Admin) => Ok(()),
        _ => Err(ClientError::NotAdmin(user.clone())),
    }
}
