//! # Domain Types
//!
//! Common data structures and enums used across the application logic.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// An inbound chat message, already stripped of platform specifics.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub author_id: String,
    pub author_name: String,
    /// The guild (Matrix room) the message was sent in. `None` for messages outside any guild.
    pub context_id: Option<String>,
    pub channel_id: String,
    pub content: String,
}

/// Who may run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionLevel {
    Member,
    Officer,
    Owner,
}

/// Whether a command shows up in the generic help listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Hidden,
}

/// The Twitter settings a guild admin can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwitterKey {
    Channel,
    ListScreenName,
    ListSlug,
}

impl TwitterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TwitterKey::Channel => "channel",
            TwitterKey::ListScreenName => "listscreenname",
            TwitterKey::ListSlug => "listslug",
        }
    }
}

impl FromStr for TwitterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "channel" => Ok(TwitterKey::Channel),
            "listscreenname" => Ok(TwitterKey::ListScreenName),
            "listslug" => Ok(TwitterKey::ListSlug),
            other => Err(format!("unknown twitter key: {other}")),
        }
    }
}

/// Game account types members can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccountType {
    SteamId,
    BattleTag,
}

impl AccountType {
    pub const ALL: [AccountType; 2] = [AccountType::BattleTag, AccountType::SteamId];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::SteamId => "steamid",
            AccountType::BattleTag => "battletag",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steamid" => Ok(AccountType::SteamId),
            "battletag" => Ok(AccountType::BattleTag),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// A tweet as returned by the list-statuses and user-timeline endpoints.
/// Only the fields the bot reads are kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tweet {
    pub id: u64,
    pub user: TweetUser,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TweetUser {
    pub screen_name: String,
}

impl Tweet {
    #[cfg(test)]
    pub fn new(id: u64, screen_name: impl Into<String>) -> Self {
        Self {
            id,
            user: TweetUser {
                screen_name: screen_name.into(),
            },
        }
    }

    pub fn author(&self) -> &str {
        &self.user.screen_name
    }

    pub fn url(&self) -> String {
        format!("https://twitter.com/{}/status/{}", self.user.screen_name, self.id)
    }
}

pub fn twitter_list_url(list_owner: &str, list_slug: &str) -> String {
    format!("https://twitter.com/{list_owner}/lists/{list_slug}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twitter_key_from_str() {
        assert_eq!("channel".parse(), Ok(TwitterKey::Channel));
        assert_eq!("listscreenname".parse(), Ok(TwitterKey::ListScreenName));
        assert_eq!("listslug".parse(), Ok(TwitterKey::ListSlug));
        assert!("slug".parse::<TwitterKey>().is_err());
    }

    #[test]
    fn test_tweet_deserialize_ignores_extra_fields() {
        let json = r#"{"id": 42, "text": "hi", "user": {"screen_name": "alice", "id": 7}}"#;
        let tweet: Tweet = serde_json::from_str(json).unwrap();
        assert_eq!(tweet, Tweet::new(42, "alice"));
        assert_eq!(tweet.url(), "https://twitter.com/alice/status/42");
    }

    #[test]
    fn test_list_url() {
        assert_eq!(
            twitter_list_url("owner", "friends"),
            "https://twitter.com/owner/lists/friends"
        );
    }
}
