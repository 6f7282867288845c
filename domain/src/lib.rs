//! Domain layer for farmstand
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Chat session
//!
//! A [`ChatSession`] is the local view of one conversation with a seller. It is
//! changed by optimistic appends (a message shows up before the backend has
//! confirmed it) and replaced wholesale when a fresh [`ChatSnapshot`] arrives.
//!
//! ## Bargain
//!
//! A bargain message carries a [`BargainOffer`]. Offers start `Pending` and
//! move once to `Accepted` or `Rejected`. Only the receiving party may answer.

pub mod account;
pub mod catalog;
pub mod chat;
pub mod core;

// Re-export commonly used types
pub use account::entities::{Role, User, UserId};
pub use catalog::{
    entities::{Product, Seller},
    filter::{ProductFilter, SortBy},
    recent::RecentSearches,
};
pub use chat::{
    bargain::{BargainDecision, BargainOffer, BargainStatus},
    entities::{
        ChatSession, ChatSnapshot, ChatSummary, Message, MessageKind, MessageSnapshot, Participant,
    },
    value_objects::{ChatId, MessageId},
};
pub use core::{error::DomainError, price::Price};
