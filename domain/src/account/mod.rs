//! Account domain.
//!
//! - [`entities::User`]: an authenticated marketplace user
//! - [`entities::Role`]: customer, seller or admin
//! - [`entities::UserId`]: backend-assigned user identifier

pub mod entities;
