//! Login use case.
//!
//! Signs in with email and password, restores a session from a persisted
//! credential, and signs out.

use crate::ports::marketplace_api::{ApiError, MarketplaceApi};
use crate::session::SessionContext;
use farmstand_domain::{DomainError, User};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoginError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct LoginUseCase {
    api: Arc<dyn MarketplaceApi>,
    context: Arc<SessionContext>,
}

impl LoginUseCase {
    pub fn new(api: Arc<dyn MarketplaceApi>, context: Arc<SessionContext>) -> Self {
        Self { api, context }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, LoginError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::Validation(format!("'{}' is not an email address", email)).into());
        }
        if password.is_empty() {
            return Err(DomainError::Validation("password is empty".to_string()).into());
        }

        let grant = self.api.login(email, password).await?;
        self.context.sign_in(grant.credential, grant.user.clone());

        let user = match grant.user {
            Some(user) => user,
            None => {
                let user = self.api.current_user().await?;
                self.context.set_user(user.clone());
                user
            }
        };
        info!("Signed in as {} ({})", user.name, user.role);
        Ok(user)
    }

    /// Re-establish the current user from a persisted credential.
    ///
    /// Returns `Ok(None)` when there is no credential or it has expired.
    pub async fn restore(&self) -> Result<Option<User>, LoginError> {
        if let Some(user) = self.context.current_user() {
            return Ok(Some(user));
        }
        if !self.context.is_signed_in() {
            return Ok(None);
        }

        match self.api.current_user().await {
            Ok(user) => {
                self.context.set_user(user.clone());
                Ok(Some(user))
            }
            Err(ApiError::Unauthorized) => {
                info!("Stored credential expired");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sign out remotely (best effort) and forget the credential.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!("Remote logout failed: {}", e);
        }
        self.context.invalidate();
    }
}
