//! # Interface Layer
//!
//! Command handlers that turn chat messages into guild operations.

pub mod commands;
