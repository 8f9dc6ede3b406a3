//! Fakes for the chat platform, guild directory, store and Twitter API.

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::guild::GuildData;
use crate::application::services::Services;
use crate::domain::errors::TwitterError;
use crate::domain::traits::{ChatProvider, GuildDirectory, KeyValueStore, TwitterApi};
use crate::domain::types::{IncomingMessage, Tweet};
use crate::infrastructure::store::memory::MemoryStore;

pub const GUILD: &str = "!guild:x";
pub const OWNER: &str = "@owner:x";
pub const CHANNEL: &str = "#general";
pub const MEMBER_ROLE: &str = "members";
pub const OFFICER_ROLE: &str = "officers";

/// A message from `author` in the test guild's `#general`.
pub fn message(author: &str, content: &str) -> IncomingMessage {
    let name = author
        .trim_start_matches('@')
        .split(':')
        .next()
        .unwrap_or(author);
    IncomingMessage {
        author_id: author.to_string(),
        author_name: name.to_string(),
        context_id: Some(GUILD.to_string()),
        channel_id: CHANNEL.to_string(),
        content: content.to_string(),
    }
}

/// Records everything sent as `(channel or user id, content)`.
#[derive(Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<(String, String)>>,
    channels: Mutex<HashMap<(String, String), String>>,
}

impl RecordingChat {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, target: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(t, _)| t == target)
            .map(|(_, content)| content)
            .collect()
    }

    pub fn last_to(&self, target: &str) -> Option<String> {
        self.sent_to(target).pop()
    }

    pub fn add_channel(&self, context_id: &str, name: &str, channel_id: &str) {
        self.channels.lock().unwrap().insert(
            (context_id.to_string(), name.to_string()),
            channel_id.to_string(),
        );
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), String> {
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), content.to_string()));
        Ok(())
    }

    async fn send_direct(&self, user_id: &str, content: &str) -> Result<(), String> {
        self.send_message(user_id, content).await
    }

    async fn find_channel(&self, context_id: &str, name: &str) -> Option<String> {
        self.channels
            .lock()
            .unwrap()
            .get(&(context_id.to_string(), name.to_string()))
            .cloned()
    }
}

/// Scripted roles, owners and display names.
#[derive(Default)]
pub struct FakeDirectory {
    owners: Mutex<HashMap<String, String>>,
    roles: Mutex<HashMap<(String, String), Vec<String>>>,
    names: Mutex<HashMap<(String, String), String>>,
    roles_error: Mutex<Option<String>>,
}

impl FakeDirectory {
    pub fn new(guild: &str, owner: &str) -> Self {
        let directory = Self::default();
        directory
            .owners
            .lock()
            .unwrap()
            .insert(guild.to_string(), owner.to_string());
        directory
    }

    pub fn grant(&self, guild: &str, user: &str, role: &str) {
        self.roles
            .lock()
            .unwrap()
            .entry((guild.to_string(), user.to_string()))
            .or_default()
            .push(role.to_string());
    }

    pub fn set_display_name(&self, guild: &str, user: &str, name: &str) {
        self.names
            .lock()
            .unwrap()
            .insert((guild.to_string(), user.to_string()), name.to_string());
    }

    pub fn fail_roles(&self, reason: &str) {
        *self.roles_error.lock().unwrap() = Some(reason.to_string());
    }
}

#[async_trait]
impl GuildDirectory for FakeDirectory {
    async fn roles(&self, context_id: &str, user_id: &str) -> Result<Vec<String>, String> {
        if let Some(reason) = self.roles_error.lock().unwrap().clone() {
            return Err(reason);
        }
        Ok(self
            .roles
            .lock()
            .unwrap()
            .get(&(context_id.to_string(), user_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn owner(&self, context_id: &str) -> Option<String> {
        self.owners.lock().unwrap().get(context_id).cloned()
    }

    async fn display_name(&self, context_id: &str, user_id: &str) -> Option<String> {
        self.names
            .lock()
            .unwrap()
            .get(&(context_id.to_string(), user_id.to_string()))
            .cloned()
    }
}

/// Scripted Twitter API that also records list membership changes.
pub struct FakeTwitter {
    list_statuses: Mutex<Result<Vec<Tweet>, TwitterError>>,
    member_count: Mutex<Result<u64, TwitterError>>,
    member_count_calls: AtomicUsize,
    timelines: Mutex<HashMap<String, Vec<Tweet>>>,
    list_ops_error: Mutex<Option<TwitterError>>,
    list_ops: Mutex<Vec<String>>,
    hung_lists: Mutex<HashSet<String>>,
}

impl Default for FakeTwitter {
    fn default() -> Self {
        Self {
            list_statuses: Mutex::new(Ok(Vec::new())),
            member_count: Mutex::new(Ok(1)),
            member_count_calls: AtomicUsize::new(0),
            timelines: Mutex::new(HashMap::new()),
            list_ops_error: Mutex::new(None),
            list_ops: Mutex::new(Vec::new()),
            hung_lists: Mutex::new(HashSet::new()),
        }
    }
}

impl FakeTwitter {
    pub fn set_list_statuses(&self, tweets: Vec<Tweet>) {
        *self.list_statuses.lock().unwrap() = Ok(tweets);
    }

    /// `list_statuses` for this slug never returns.
    pub fn hang_list(&self, list_slug: &str) {
        self.hung_lists.lock().unwrap().insert(list_slug.to_string());
    }

    pub fn fail_list_statuses(&self, err: TwitterError) {
        *self.list_statuses.lock().unwrap() = Err(err);
    }

    pub fn set_member_count(&self, count: Result<u64, TwitterError>) {
        *self.member_count.lock().unwrap() = count;
    }

    pub fn member_count_calls(&self) -> usize {
        self.member_count_calls.load(Ordering::SeqCst)
    }

    pub fn set_timeline(&self, screen_name: &str, tweets: Vec<Tweet>) {
        self.timelines
            .lock()
            .unwrap()
            .insert(screen_name.to_string(), tweets);
    }

    pub fn fail_list_ops(&self, err: TwitterError) {
        *self.list_ops_error.lock().unwrap() = Some(err);
    }

    /// e.g. `add owner/slug alice`
    pub fn list_ops(&self) -> Vec<String> {
        self.list_ops.lock().unwrap().clone()
    }

    fn list_op(&self, op: &str, owner: &str, slug: &str, screen_name: &str) -> Result<(), TwitterError> {
        if let Some(err) = self.list_ops_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.list_ops
            .lock()
            .unwrap()
            .push(format!("{op} {owner}/{slug} {screen_name}"));
        Ok(())
    }
}

#[async_trait]
impl TwitterApi for FakeTwitter {
    async fn list_statuses(
        &self,
        _list_owner: &str,
        list_slug: &str,
        max_count: usize,
    ) -> Result<Vec<Tweet>, TwitterError> {
        let hung = self.hung_lists.lock().unwrap().contains(list_slug);
        if hung {
            std::future::pending::<()>().await;
        }
        self.list_statuses
            .lock()
            .unwrap()
            .clone()
            .map(|tweets| tweets.into_iter().take(max_count).collect())
    }

    async fn list_member_count(
        &self,
        _list_owner: &str,
        _list_slug: &str,
    ) -> Result<u64, TwitterError> {
        self.member_count_calls.fetch_add(1, Ordering::SeqCst);
        self.member_count.lock().unwrap().clone()
    }

    async fn user_timeline(
        &self,
        screen_name: &str,
        max_count: usize,
    ) -> Result<Vec<Tweet>, TwitterError> {
        match self.timelines.lock().unwrap().get(screen_name) {
            Some(tweets) => Ok(tweets.iter().take(max_count).cloned().collect()),
            None => Err(TwitterError::Api("Sorry, that page does not exist.".to_string())),
        }
    }

    async fn add_list_member(
        &self,
        list_owner: &str,
        list_slug: &str,
        screen_name: &str,
    ) -> Result<(), TwitterError> {
        self.list_op("add", list_owner, list_slug, screen_name)
    }

    async fn remove_list_member(
        &self,
        list_owner: &str,
        list_slug: &str,
        screen_name: &str,
    ) -> Result<(), TwitterError> {
        self.list_op("remove", list_owner, list_slug, screen_name)
    }
}

/// A store whose every call fails.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn hash_get(&self, _key: &str, _field: &str) -> Result<Option<String>> {
        bail!("store is down")
    }

    async fn hash_set(&self, _key: &str, _fields: &[(&str, &str)]) -> Result<()> {
        bail!("store is down")
    }

    async fn hash_delete(&self, _key: &str, _field: &str) -> Result<()> {
        bail!("store is down")
    }

    async fn set_add(&self, _key: &str, _member: &str) -> Result<()> {
        bail!("store is down")
    }

    async fn set_remove(&self, _key: &str, _member: &str) -> Result<()> {
        bail!("store is down")
    }

    async fn set_members(&self, _key: &str) -> Result<Vec<String>> {
        bail!("store is down")
    }
}

/// Fakes wired together around one guild owned by `OWNER`.
pub struct TestBed {
    pub chat: Arc<RecordingChat>,
    pub directory: Arc<FakeDirectory>,
    pub store: Arc<dyn KeyValueStore>,
    pub twitter: Arc<FakeTwitter>,
}

impl TestBed {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            chat: Arc::new(RecordingChat::default()),
            directory: Arc::new(FakeDirectory::new(GUILD, OWNER)),
            store,
            twitter: Arc::new(FakeTwitter::default()),
        }
    }

    pub fn services(&self) -> Arc<Services> {
        Arc::new(Services {
            chat: self.chat.clone(),
            directory: self.directory.clone(),
            store: self.store.clone(),
        })
    }

    pub fn guild(&self) -> GuildData {
        GuildData::new(self.store.clone(), GUILD)
    }

    pub async fn make_member(&self, user: &str) {
        self.guild().set_member_role(MEMBER_ROLE).await.unwrap();
        self.directory.grant(GUILD, user, MEMBER_ROLE);
    }

    pub async fn make_officer(&self, user: &str) {
        self.guild().set_officer_role(OFFICER_ROLE).await.unwrap();
        self.directory.grant(GUILD, user, OFFICER_ROLE);
    }
}
