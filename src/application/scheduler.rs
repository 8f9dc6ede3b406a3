//! # Twitter Scheduler
//!
//! Posts sampled tweets to each guild's configured channel on a randomized interval.
//! At most one loop runs per guild; its entry in the active map is released when the loop
//! exits, whether it was cancelled or its task was dropped.

use anyhow::{Result, anyhow};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::sampler::ListSampler;
use crate::application::services::Services;
use crate::domain::config::SchedulerConfig;
use crate::domain::types::TwitterKey;

pub struct TwitterScheduler {
    services: Arc<Services>,
    sampler: Arc<ListSampler>,
    config: SchedulerConfig,
    /// Guild id to the sender that cancels its loop.
    active: Arc<DashMap<String, watch::Sender<bool>>>,
}

/// Removes a guild from the active map when its loop ends.
struct ActiveGuard {
    active: Arc<DashMap<String, watch::Sender<bool>>>,
    guild_id: String,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.remove(&self.guild_id);
        tracing::debug!("Twitter scheduler for {} stopped", self.guild_id);
    }
}

impl TwitterScheduler {
    pub fn new(services: Arc<Services>, sampler: Arc<ListSampler>, config: SchedulerConfig) -> Self {
        Self {
            services,
            sampler,
            config,
            active: Arc::new(DashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn is_active(&self, guild_id: &str) -> bool {
        self.active.contains_key(guild_id)
    }

    /// Start the posting loop for a guild. Returns `None` if one is already running.
    pub fn start(self: &Arc<Self>, guild_id: &str) -> Option<JoinHandle<()>> {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        match self.active.entry(guild_id.to_string()) {
            Entry::Occupied(_) => return None,
            Entry::Vacant(slot) => {
                slot.insert(cancel_tx);
            }
        }

        let guard = ActiveGuard {
            active: self.active.clone(),
            guild_id: guild_id.to_string(),
        };
        let scheduler = self.clone();
        Some(tokio::spawn(async move {
            tracing::info!("Twitter scheduler started for {}", guard.guild_id);
            loop {
                let delay = scheduler.next_delay();
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel_rx.changed() => break,
                }
                if let Err(e) = scheduler.post_round(&guard.guild_id).await {
                    tracing::warn!("Twitter round for {} failed: {:#}", guard.guild_id, e);
                }
            }
        }))
    }

    /// Ask a guild's loop to stop. Returns whether a loop was running.
    pub fn cancel(&self, guild_id: &str) -> bool {
        match self.active.get(guild_id) {
            Some(sender) => {
                let _ = sender.send(true);
                true
            }
            None => false,
        }
    }

    fn next_delay(&self) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.0..=1.0) * self.config.jitter().as_secs_f64();
        self.config.min_delay() + Duration::from_secs_f64(jitter)
    }

    /// Sample the guild's list once and post the results. Returns how many were posted.
    pub async fn post_round(&self, guild_id: &str) -> Result<usize> {
        let guild = self.services.guild(guild_id);
        let list = guild.twitter_list().await?;
        let channel_name = guild.twitter_data(TwitterKey::Channel).await?;
        let channel = match &channel_name {
            Some(name) => self.services.chat.find_channel(guild_id, name).await,
            None => None,
        };

        let (Some((owner, slug)), Some(channel)) = (list, channel) else {
            tracing::warn!("Can't post tweets for {} due to missing config", guild_id);
            return Ok(0);
        };

        let posts = self
            .sampler
            .sample(&owner, &slug)
            .await
            .map_err(|e| anyhow!("Sampling {}/{} failed: {}", owner, slug, e))?;

        for post in &posts {
            tracing::debug!("Posting {} (weight {}) to {}", post.url, post.weight, channel);
            self.services
                .chat
                .send_message(&channel, &post.url)
                .await
                .map_err(|e| anyhow!(e))?;
        }
        Ok(posts.len())
    }
}
