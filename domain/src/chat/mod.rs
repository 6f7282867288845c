//! Chat domain.
//!
//! - [`entities::ChatSession`]: one open conversation and its message list
//! - [`entities::Message`]: a single message, plain, bargain or AI-generated
//! - [`entities::ChatSnapshot`]: authoritative backend state used to reconcile
//! - [`bargain::BargainOffer`]: a price offer with a pending/accepted/rejected lifecycle

pub mod bargain;
pub mod entities;
pub mod value_objects;
