//! Signed-in session context.
//!
//! Holds the bearer credential and the current user for the lifetime of a
//! login. Created once at startup, handed to the HTTP adapter and to use
//! cases, and invalidated on logout or on any 401 from the backend.

use crate::ports::credential_store::{Credential, CredentialStore};
use farmstand_domain::{User, UserId};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    credential: RwLock<Option<Credential>>,
    user: RwLock<Option<User>>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            credential: RwLock::new(None),
            user: RwLock::new(None),
        }
    }

    /// Credential for the next request.
    ///
    /// Served from the cache; on a miss the persistent store is consulted and
    /// a hit is cached. Store failures are logged and treated as signed out.
    pub fn bearer(&self) -> Option<Credential> {
        if let Some(c) = self.credential.read().unwrap_or_else(|e| e.into_inner()).clone() {
            return Some(c);
        }

        match self.store.load() {
            Ok(Some(c)) => {
                debug!("Loaded credential from persistent store");
                *self.credential.write().unwrap_or_else(|e| e.into_inner()) = Some(c.clone());
                Some(c)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read stored credential: {}", e);
                None
            }
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.bearer().is_some()
    }

    /// Cache and persist a freshly issued credential.
    pub fn sign_in(&self, credential: Credential, user: Option<User>) {
        if let Err(e) = self.store.save(&credential) {
            warn!("Could not persist credential: {}", e);
        }
        *self.credential.write().unwrap_or_else(|e| e.into_inner()) = Some(credential);
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = user;
    }

    pub fn set_user(&self, user: User) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user);
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.user
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|u| u.id.clone())
    }

    /// Forget the credential and user, both cached and persisted.
    pub fn invalidate(&self) {
        debug!("Invalidating session credential");
        *self.credential.write().unwrap_or_else(|e| e.into_inner()) = None;
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Err(e) = self.store.clear() {
            warn!("Could not clear stored credential: {}", e);
        }
    }
}
