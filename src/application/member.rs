//! Per-member data, stored under `guild_member:hash:<guild>:<member>`.

use anyhow::Result;
use std::sync::Arc;

use crate::domain::traits::KeyValueStore;
use crate::domain::types::AccountType;
use crate::infrastructure::store::make_key;

#[derive(Clone)]
pub struct MemberData {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl MemberData {
    pub fn new(store: Arc<dyn KeyValueStore>, guild_id: &str, member_id: &str) -> Self {
        Self {
            store,
            key: make_key(&["guild_member", "hash", guild_id, member_id]),
        }
    }

    pub async fn account_id(&self, account_type: AccountType) -> Result<Option<String>> {
        self.store.hash_get(&self.key, account_type.as_str()).await
    }

    pub async fn set_account_id(&self, account_type: AccountType, account_id: &str) -> Result<()> {
        self.store
            .hash_set(&self.key, &[(account_type.as_str(), account_id)])
            .await
    }

    pub async fn clear_account_id(&self, account_type: AccountType) -> Result<()> {
        self.store.hash_delete(&self.key, account_type.as_str()).await
    }
}
