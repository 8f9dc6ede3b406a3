//! # Twitter
//!
//! REST client for the handful of v1.1 endpoints the bot uses, plus request signing.

pub mod client;
pub mod oauth;

pub use client::TwitterClient;
