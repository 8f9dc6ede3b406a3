//! # Domain Traits
//!
//! Abstract interfaces for the external collaborators (chat platform, persistence, Twitter).
//! Allows for pluggable implementations in the Infrastructure layer and fakes in tests.

use async_trait::async_trait;

use crate::domain::errors::TwitterError;
use crate::domain::types::Tweet;

/// Abstract interface for a Chat Provider (e.g., Matrix)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to a channel
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), String>;

    /// Send a private message to a user
    async fn send_direct(&self, user_id: &str, content: &str) -> Result<(), String>;

    /// Find a text channel of a guild by its name
    async fn find_channel(&self, context_id: &str, name: &str) -> Option<String>;
}

/// Group membership lookups used by permission checks.
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    /// Role names held by a user within a guild. Non-members hold no roles.
    async fn roles(&self, context_id: &str, user_id: &str) -> Result<Vec<String>, String>;

    /// The guild's owner, if one is known.
    async fn owner(&self, context_id: &str) -> Option<String>;

    /// A human readable name for a guild member, if they are still around.
    async fn display_name(&self, context_id: &str, user_id: &str) -> Option<String>;
}

/// Flat hash/set key-value store (Redis in production).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn hash_get(&self, key: &str, field: &str) -> anyhow::Result<Option<String>>;

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> anyhow::Result<()>;

    async fn hash_delete(&self, key: &str, field: &str) -> anyhow::Result<()>;

    async fn set_add(&self, key: &str, member: &str) -> anyhow::Result<()>;

    async fn set_remove(&self, key: &str, member: &str) -> anyhow::Result<()>;

    /// Members of a set, sorted.
    async fn set_members(&self, key: &str) -> anyhow::Result<Vec<String>>;
}

/// The subset of the Twitter v1.1 API the bot uses.
#[async_trait]
pub trait TwitterApi: Send + Sync {
    /// Recent tweets from members of a list, newest first.
    async fn list_statuses(
        &self,
        list_owner: &str,
        list_slug: &str,
        max_count: usize,
    ) -> Result<Vec<Tweet>, TwitterError>;

    /// Number of members in a list.
    async fn list_member_count(&self, list_owner: &str, list_slug: &str)
    -> Result<u64, TwitterError>;

    /// Recent tweets of a single user, newest first.
    async fn user_timeline(
        &self,
        screen_name: &str,
        max_count: usize,
    ) -> Result<Vec<Tweet>, TwitterError>;

    async fn add_list_member(
        &self,
        list_owner: &str,
        list_slug: &str,
        screen_name: &str,
    ) -> Result<(), TwitterError>;

    async fn remove_list_member(
        &self,
        list_owner: &str,
        list_slug: &str,
        screen_name: &str,
    ) -> Result<(), TwitterError>;
}
