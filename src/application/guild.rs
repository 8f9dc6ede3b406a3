//! # Guild Data
//!
//! Per-guild settings and account registries kept in the key-value store.
//!
//! Layout:
//! - `guild:hash:<guild>` holds `command_prefix`, `member_role`, `officer_role` and the
//!   `twitter_*` settings.
//! - `guild:set:<account_type>:<guild>` holds the ids of members who registered that account.

use anyhow::Result;
use std::sync::Arc;

use crate::application::member::MemberData;
use crate::domain::traits::KeyValueStore;
use crate::domain::types::{AccountType, TwitterKey};
use crate::infrastructure::store::make_key;

pub const DEFAULT_COMMAND_PREFIX: &str = "!";

const COMMAND_PREFIX_FIELD: &str = "command_prefix";
const MEMBER_ROLE_FIELD: &str = "member_role";
const OFFICER_ROLE_FIELD: &str = "officer_role";

#[derive(Clone)]
pub struct GuildData {
    store: Arc<dyn KeyValueStore>,
    guild_id: String,
}

impl GuildData {
    pub fn new(store: Arc<dyn KeyValueStore>, guild_id: impl Into<String>) -> Self {
        Self {
            store,
            guild_id: guild_id.into(),
        }
    }

    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    pub fn member(&self, member_id: &str) -> MemberData {
        MemberData::new(self.store.clone(), &self.guild_id, member_id)
    }

    fn hash_key(&self) -> String {
        make_key(&["guild", "hash", &self.guild_id])
    }

    fn set_key(&self, name: &str) -> String {
        make_key(&["guild", "set", name, &self.guild_id])
    }

    /// Empty values are treated as unset.
    async fn field(&self, field: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .hash_get(&self.hash_key(), field)
            .await?
            .filter(|v| !v.is_empty()))
    }

    async fn set_field(&self, field: &str, value: &str) -> Result<()> {
        tracing::debug!("guild {} set {} = {}", self.guild_id, field, value);
        self.store.hash_set(&self.hash_key(), &[(field, value)]).await
    }

    pub async fn command_prefix(&self) -> Result<Option<String>> {
        self.field(COMMAND_PREFIX_FIELD).await
    }

    pub async fn set_command_prefix(&self, prefix: &str) -> Result<()> {
        self.set_field(COMMAND_PREFIX_FIELD, prefix).await
    }

    pub async fn member_role(&self) -> Result<Option<String>> {
        self.field(MEMBER_ROLE_FIELD).await
    }

    pub async fn set_member_role(&self, role: &str) -> Result<()> {
        self.set_field(MEMBER_ROLE_FIELD, role).await
    }

    pub async fn officer_role(&self) -> Result<Option<String>> {
        self.field(OFFICER_ROLE_FIELD).await
    }

    pub async fn set_officer_role(&self, role: &str) -> Result<()> {
        self.set_field(OFFICER_ROLE_FIELD, role).await
    }

    pub async fn twitter_data(&self, key: TwitterKey) -> Result<Option<String>> {
        self.field(&format!("twitter_{}", key.as_str())).await
    }

    pub async fn set_twitter_data(&self, key: TwitterKey, value: &str) -> Result<()> {
        self.set_field(&format!("twitter_{}", key.as_str()), value)
            .await
    }

    /// The configured list as `(owner screen name, slug)`, if both halves are set.
    pub async fn twitter_list(&self) -> Result<Option<(String, String)>> {
        let owner = self.twitter_data(TwitterKey::ListScreenName).await?;
        let slug = self.twitter_data(TwitterKey::ListSlug).await?;
        Ok(owner.zip(slug))
    }

    /// Ids of members who registered an account of this type, sorted.
    pub async fn account_holders(&self, account_type: AccountType) -> Result<Vec<String>> {
        self.store
            .set_members(&self.set_key(account_type.as_str()))
            .await
    }

    pub async fn add_account_holder(&self, account_type: AccountType, member_id: &str) -> Result<()> {
        self.store
            .set_add(&self.set_key(account_type.as_str()), member_id)
            .await
    }

    pub async fn remove_account_holder(
        &self,
        account_type: AccountType,
        member_id: &str,
    ) -> Result<()> {
        self.store
            .set_remove(&self.set_key(account_type.as_str()), member_id)
            .await
    }
}
