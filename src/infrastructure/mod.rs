//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., ChatProvider, KeyValueStore, TwitterApi).

pub mod matrix;
pub mod store;
pub mod twitter;
