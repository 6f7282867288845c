//! Port for persisting the bearer credential between runs.

use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// Bearer token issued by the backend at login.
///
/// `Debug` output is redacted so the token never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Error, Debug)]
pub enum CredentialStoreError {
    #[error("Credential storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent storage for the credential.
///
/// Synchronous: reads are rare because [`SessionContext`](crate::SessionContext)
/// caches the value after the first hit.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>, CredentialStoreError>;

    fn save(&self, credential: &Credential) -> Result<(), CredentialStoreError>;

    fn clear(&self) -> Result<(), CredentialStoreError>;
}

/// Process-local store, for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    value: Mutex<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            value: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, CredentialStoreError> {
        Ok(self.value.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
