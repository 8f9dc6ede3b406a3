//! Shared handles to the bot's collaborators, built once in `main` and passed to handlers.

use std::sync::Arc;

use crate::application::guild::GuildData;
use crate::domain::traits::{ChatProvider, GuildDirectory, KeyValueStore};

#[derive(Clone)]
pub struct Services {
    pub chat: Arc<dyn ChatProvider>,
    pub directory: Arc<dyn GuildDirectory>,
    pub store: Arc<dyn KeyValueStore>,
}

impl Services {
    pub fn guild(&self, guild_id: &str) -> GuildData {
        GuildData::new(self.store.clone(), guild_id)
    }
}
