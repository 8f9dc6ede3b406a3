//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes command dispatch, permissions, guild data access and the Twitter sampler/scheduler.

pub mod context;
pub mod dispatcher;
pub mod guild;
pub mod member;
pub mod permissions;
pub mod sampler;
pub mod scheduler;
pub mod services;
