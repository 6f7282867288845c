//! HTTP adapter for the marketplace backend

mod client;
mod wire;

pub use client::RestMarketplaceApi;
