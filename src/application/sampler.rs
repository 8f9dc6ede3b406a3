//! # Twitter List Sampler
//!
//! Picks which recent tweets from a list to share, spreading attention across list members.
//!
//! Every author has a weight in `[0.0, 1.0)`, absent meaning `1.0`. An author's best candidate
//! scores their weight; the top scorers are shown and their authors drop to `0.0`. After each
//! round every tracked weight grows by `k = shown / max(list_size, 1)` and weights reaching
//! `1.0` stop being tracked. An author is never shown a tweet at or below the last id shown
//! for them.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::config::SamplerConfig;
use crate::domain::errors::TwitterError;
use crate::domain::traits::TwitterApi;
use crate::domain::types::Tweet;

pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A tweet the sampler chose, with its author's weight at selection time.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPost {
    pub url: String,
    pub author: String,
    pub post_id: u64,
    pub weight: f64,
}

/// `k` for a round that showed `shown` tweets from a list of `list_size` members.
pub fn decay_constant(list_size: u64, shown: usize) -> f64 {
    (1.0 / list_size.max(1) as f64) * shown as f64
}

/// Weight state for one list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WeightingStore {
    weights: HashMap<String, f64>,
    last_shown: HashMap<String, u64>,
}

impl WeightingStore {
    pub fn weight(&self, author: &str) -> f64 {
        self.weights.get(author).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    #[cfg(test)]
    pub fn is_tracked(&self, author: &str) -> bool {
        self.weights.contains_key(author)
    }

    pub fn last_shown(&self, author: &str) -> Option<u64> {
        self.last_shown.get(author).copied()
    }

    /// Score candidates and return the `limit` best, one per author, highest weight first.
    /// Equal scores keep input order, so an author's first eligible tweet represents them.
    pub fn rank<'a>(&self, candidates: &'a [Tweet], limit: usize) -> Vec<(&'a Tweet, f64)> {
        let mut best: Vec<(&'a Tweet, f64)> = Vec::new();
        let mut slot_by_author: HashMap<&str, usize> = HashMap::new();

        for tweet in candidates {
            let author = tweet.author();
            if self.last_shown(author).is_some_and(|last| tweet.id <= last) {
                continue;
            }
            let score = self.weight(author);
            match slot_by_author.get(author) {
                Some(&slot) => {
                    if score > best[slot].1 {
                        best[slot] = (tweet, score);
                    }
                }
                None => {
                    slot_by_author.insert(author, best.len());
                    best.push((tweet, score));
                }
            }
        }

        // sort_by is stable
        best.sort_by(|a, b| b.1.total_cmp(&a.1));
        best.truncate(limit);
        best
    }

    /// Apply a finished round: zero shown authors, raise their id floor, then decay.
    pub fn record_round(&mut self, shown: &[&Tweet], list_size: u64) {
        for tweet in shown {
            let author = tweet.author().to_string();
            self.weights.insert(author.clone(), 0.0);
            let floor = self.last_shown.entry(author).or_insert(0);
            *floor = (*floor).max(tweet.id);
        }

        let k = decay_constant(list_size, shown.len());
        self.weights.retain(|_, weight| {
            *weight += k;
            *weight < DEFAULT_WEIGHT
        });
    }
}

/// Samples lists through the Twitter API, keeping a `WeightingStore` per list in memory.
/// Each list has its own lock, so a slow list never holds up another.
pub struct ListSampler {
    twitter: Arc<dyn TwitterApi>,
    config: SamplerConfig,
    lists: DashMap<(String, String), Arc<Mutex<WeightingStore>>>,
}

impl ListSampler {
    pub fn new(twitter: Arc<dyn TwitterApi>, config: SamplerConfig) -> Self {
        Self {
            twitter,
            config,
            lists: DashMap::new(),
        }
    }

    /// Run one round for a list.
    ///
    /// The weighting store is only touched once both the candidates and the list size have been
    /// fetched, so a failed round leaves it as it was. An empty result is not an error.
    pub async fn sample(
        &self,
        list_owner: &str,
        list_slug: &str,
    ) -> Result<Vec<SampledPost>, TwitterError> {
        let key = (list_owner.to_string(), list_slug.to_string());
        let list = Arc::clone(self.lists.entry(key).or_default().value());
        // One round per list at a time
        let mut store = list.lock().await;

        let candidates = self
            .twitter
            .list_statuses(list_owner, list_slug, self.config.max_candidates)
            .await?;
        tracing::debug!(
            "Sampler got {} candidates from {}/{}",
            candidates.len(),
            list_owner,
            list_slug
        );

        let shown = store.rank(&candidates, self.config.results_to_return);
        if shown.is_empty() {
            return Ok(Vec::new());
        }

        let list_size = self
            .twitter
            .list_member_count(list_owner, list_slug)
            .await?;

        let shown_tweets: Vec<&Tweet> = shown.iter().map(|(tweet, _)| *tweet).collect();
        store.record_round(&shown_tweets, list_size);
        tracing::debug!(
            "Sampler weights for {}/{} after round: {:?}",
            list_owner,
            list_slug,
            store.weights
        );

        Ok(shown
            .into_iter()
            .map(|(tweet, weight)| SampledPost {
                url: tweet.url(),
                author: tweet.author().to_string(),
                post_id: tweet.id,
                weight,
            })
            .collect())
    }

    /// Snapshot of a list's weighting state.
    #[cfg(test)]
    pub async fn weighting(&self, list_owner: &str, list_slug: &str) -> WeightingStore {
        let key = (list_owner.to_string(), list_slug.to_string());
        let Some(store) = self.lists.get(&key).map(|entry| Arc::clone(entry.value())) else {
            return WeightingStore::default();
        };
        let snapshot = store.lock().await.clone();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeTwitter;

    const EPS: f64 = 1e-9;

    fn sampler(twitter: &Arc<FakeTwitter>, results_to_return: usize) -> ListSampler {
        ListSampler::new(
            twitter.clone(),
            SamplerConfig {
                max_candidates: 33,
                results_to_return,
            },
        )
    }

    #[test]
    fn test_decay_constant() {
        assert!((decay_constant(10, 1) - 0.1).abs() < EPS);
        assert!((decay_constant(4, 2) - 0.5).abs() < EPS);
        assert!((decay_constant(0, 1) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_same_author_equal_weight_keeps_first_seen() {
        let store = WeightingStore::default();
        let candidates = vec![Tweet::new(9, "amy"), Tweet::new(5, "amy")];
        let ranked = store.rank(&candidates, 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0.id, 9);
    }

    #[test]
    fn test_rank_orders_by_weight_then_input_order() {
        let mut store = WeightingStore::default();
        store.weights.insert("bob".to_string(), 0.3);
        let candidates = vec![
            Tweet::new(3, "bob"),
            Tweet::new(2, "cat"),
            Tweet::new(1, "dan"),
        ];
        let ranked: Vec<&str> = store
            .rank(&candidates, 3)
            .iter()
            .map(|(t, _)| t.author())
            .collect();
        assert_eq!(ranked, vec!["cat", "dan", "bob"]);
    }

    #[test]
    fn test_record_round_evicts_untracked_and_saturated() {
        let mut store = WeightingStore::default();
        store.weights.insert("old".to_string(), 0.95);
        store.weights.insert("mid".to_string(), 0.5);
        let shown = Tweet::new(7, "amy");

        store.record_round(&[&shown], 10);

        assert!((store.weight("amy") - 0.1).abs() < EPS);
        assert!((store.weight("mid") - 0.6).abs() < EPS);
        assert!(!store.is_tracked("old"));
        assert!(!store.is_tracked("bob"));
        assert_eq!(store.last_shown("amy"), Some(7));
    }

    #[tokio::test]
    async fn test_list_of_ten_one_shown() {
        let twitter = Arc::new(FakeTwitter::default());
        twitter.set_list_statuses(vec![Tweet::new(20, "amy"), Tweet::new(19, "bob")]);
        twitter.set_member_count(Ok(10));
        let sampler = sampler(&twitter, 1);

        let shown = sampler.sample("o", "s").await.unwrap();
        assert_eq!(
            shown,
            vec![SampledPost {
                url: "https://twitter.com/amy/status/20".to_string(),
                author: "amy".to_string(),
                post_id: 20,
                weight: 1.0,
            }]
        );

        let weights = sampler.weighting("o", "s").await;
        assert!((weights.weight("amy") - 0.1).abs() < EPS);
        assert!(!weights.is_tracked("bob"));
    }

    #[tokio::test]
    async fn test_weights_grow_by_k_until_selected_again() {
        let twitter = Arc::new(FakeTwitter::default());
        twitter.set_member_count(Ok(4));
        let sampler = sampler(&twitter, 1);

        // Each round offers a fresh tweet from every author, so the unshown author with the
        // highest weight is picked and no author is picked twice in a row.
        let authors = ["amy", "bob", "cat", "dan"];
        let mut next_id = 100;
        let mut history: Vec<WeightingStore> = Vec::new();
        let mut picked: Vec<String> = Vec::new();
        for _ in 0..4 {
            let round: Vec<Tweet> = authors
                .iter()
                .map(|a| {
                    next_id += 1;
                    Tweet::new(next_id, *a)
                })
                .collect();
            twitter.set_list_statuses(round);
            let shown = sampler.sample("o", "s").await.unwrap();
            assert_eq!(shown.len(), 1);
            picked.push(shown[0].author.clone());
            history.push(sampler.weighting("o", "s").await);
        }

        assert_eq!(picked, vec!["amy", "bob", "cat", "dan"]);
        let k = 0.25;
        for (round, author) in picked.iter().enumerate() {
            assert!((history[round].weight(author) - k).abs() < EPS);
            for later in round + 1..history.len() {
                let grown = history[later].weight(author) - history[later - 1].weight(author);
                assert!((grown - k).abs() < EPS, "{author} grew by {grown}");
            }
        }
    }

    #[tokio::test]
    async fn test_empty_pool_leaves_store_unchanged() {
        let twitter = Arc::new(FakeTwitter::default());
        twitter.set_list_statuses(vec![Tweet::new(1, "amy")]);
        twitter.set_member_count(Ok(3));
        let sampler = sampler(&twitter, 1);
        sampler.sample("o", "s").await.unwrap();
        let before = sampler.weighting("o", "s").await;

        twitter.set_list_statuses(Vec::new());
        let shown = sampler.sample("o", "s").await.unwrap();

        assert!(shown.is_empty());
        assert_eq!(sampler.weighting("o", "s").await, before);
        assert_eq!(twitter.member_count_calls(), 1);
    }

    #[tokio::test]
    async fn test_already_shown_ids_are_never_returned() {
        let twitter = Arc::new(FakeTwitter::default());
        twitter.set_member_count(Ok(1));
        let sampler = sampler(&twitter, 5);

        twitter.set_list_statuses(vec![Tweet::new(10, "amy")]);
        sampler.sample("o", "s").await.unwrap();

        // Same id, an older id, and a newer one
        twitter.set_list_statuses(vec![
            Tweet::new(10, "amy"),
            Tweet::new(8, "amy"),
            Tweet::new(11, "bob"),
        ]);
        let shown = sampler.sample("o", "s").await.unwrap();
        let ids: Vec<u64> = shown.iter().map(|p| p.post_id).collect();
        assert_eq!(ids, vec![11]);
    }

    #[tokio::test]
    async fn test_list_size_failure_is_atomic() {
        let twitter = Arc::new(FakeTwitter::default());
        twitter.set_list_statuses(vec![Tweet::new(1, "amy")]);
        twitter.set_member_count(Err(TwitterError::Api("Rate limit exceeded".to_string())));
        let sampler = sampler(&twitter, 1);

        let err = sampler.sample("o", "s").await.unwrap_err();
        assert_eq!(err.to_string(), "Rate limit exceeded");
        assert_eq!(sampler.weighting("o", "s").await, WeightingStore::default());
    }

    #[tokio::test]
    async fn test_candidate_fetch_failure_propagates() {
        let twitter = Arc::new(FakeTwitter::default());
        twitter.fail_list_statuses(TwitterError::Status(503));
        let sampler = sampler(&twitter, 1);

        assert_eq!(
            sampler.sample("o", "s").await,
            Err(TwitterError::Status(503))
        );
        assert_eq!(twitter.member_count_calls(), 0);
    }

    #[tokio::test]
    async fn test_lists_are_weighted_independently() {
        let twitter = Arc::new(FakeTwitter::default());
        twitter.set_list_statuses(vec![Tweet::new(1, "amy")]);
        twitter.set_member_count(Ok(10));
        let sampler = sampler(&twitter, 1);

        sampler.sample("o", "first").await.unwrap();
        assert!(sampler.weighting("o", "first").await.is_tracked("amy"));
        assert!(!sampler.weighting("o", "second").await.is_tracked("amy"));
    }

    #[tokio::test]
    async fn test_hung_list_does_not_block_other_lists() {
        let twitter = Arc::new(FakeTwitter::default());
        twitter.set_list_statuses(vec![Tweet::new(1, "amy")]);
        twitter.hang_list("slow");
        let sampler = Arc::new(sampler(&twitter, 1));

        let hung = tokio::spawn({
            let sampler = sampler.clone();
            async move { sampler.sample("o", "slow").await }
        });
        // Let the hung round take its list's lock
        tokio::task::yield_now().await;

        let fast = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            sampler.sample("o", "fast"),
        )
        .await;
        assert!(matches!(fast, Ok(Ok(ref posts)) if posts.len() == 1));
        assert!(!hung.is_finished());
        hung.abort();
    }
}
