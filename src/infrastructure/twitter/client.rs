//! Twitter v1.1 REST client.
//!
//! Reads use OAuth 1.0a user context when all four user keys are configured, otherwise the
//! application bearer token. List membership writes always need user context.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

use super::oauth::{self, Credentials};
use crate::domain::config::TwitterConfig;
use crate::domain::errors::TwitterError;
use crate::domain::traits::TwitterApi;
use crate::domain::types::Tweet;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/1.1";

enum Auth<'a> {
    User(Credentials<'a>),
    Bearer(&'a str),
}

pub struct TwitterClient {
    http: reqwest::Client,
    config: TwitterConfig,
    api_base: String,
}

impl TwitterClient {
    pub fn new(config: TwitterConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            http,
            config,
            api_base,
        })
    }

    fn user_credentials(&self) -> Option<Credentials<'_>> {
        Some(Credentials {
            consumer_key: self.config.consumer_key.as_deref()?,
            consumer_secret: self.config.consumer_secret.as_deref()?,
            access_token: self.config.access_token.as_deref()?,
            access_token_secret: self.config.access_token_secret.as_deref()?,
        })
    }

    fn read_auth(&self) -> Result<Auth<'_>, TwitterError> {
        if let Some(credentials) = self.user_credentials() {
            return Ok(Auth::User(credentials));
        }
        self.config
            .bearer_token
            .as_deref()
            .map(Auth::Bearer)
            .ok_or(TwitterError::NotConfigured)
    }

    fn write_auth(&self) -> Result<Auth<'_>, TwitterError> {
        self.user_credentials()
            .map(Auth::User)
            .ok_or(TwitterError::NotConfigured)
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: Vec<(String, String)>,
        auth: Auth<'_>,
    ) -> Result<Value, TwitterError> {
        let url = format!("{}/{}", self.api_base, endpoint);
        let authorization = match auth {
            Auth::User(credentials) => oauth::authorization_header(
                &credentials,
                method.as_str(),
                &url,
                &params,
                &oauth::make_nonce(),
                chrono::Utc::now().timestamp(),
            ),
            Auth::Bearer(token) => format!("Bearer {}", token),
        };

        let builder = self
            .http
            .request(method.clone(), &url)
            .header("Authorization", authorization);
        let builder = if method == Method::GET {
            builder.query(&params)
        } else {
            builder.form(&params)
        };

        tracing::debug!("Twitter {} {}", method, endpoint);
        let resp = builder
            .send()
            .await
            .map_err(|e| TwitterError::Http(e.to_string()))?;
        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .unwrap_or(Value::Null);

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &body);
            tracing::warn!("Twitter {} {} failed: {}", method, endpoint, err);
            return Err(err);
        }
        Ok(body)
    }
}

/// Prefer the first message Twitter put in `errors`, fall back to the status code.
fn error_from_body(status: u16, body: &Value) -> TwitterError {
    body.get("errors")
        .and_then(|errors| errors.get(0))
        .and_then(|first| first.get("message"))
        .and_then(Value::as_str)
        .map(|message| TwitterError::Api(message.to_string()))
        .unwrap_or(TwitterError::Status(status))
}

/// Deserialize an array of tweets, skipping entries that don't have the fields we need.
fn parse_tweets(body: Value) -> Result<Vec<Tweet>, TwitterError> {
    let Value::Array(items) = body else {
        return Err(TwitterError::Decode("expected an array of tweets".to_string()));
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Tweet>(item) {
            Ok(tweet) => Some(tweet),
            Err(e) => {
                tracing::warn!("Skipping malformed tweet: {}", e);
                None
            }
        })
        .collect())
}

fn list_params(list_owner: &str, list_slug: &str) -> Vec<(String, String)> {
    vec![
        ("owner_screen_name".to_string(), list_owner.to_string()),
        ("slug".to_string(), list_slug.to_string()),
    ]
}

#[async_trait]
impl TwitterApi for TwitterClient {
    async fn list_statuses(
        &self,
        list_owner: &str,
        list_slug: &str,
        max_count: usize,
    ) -> Result<Vec<Tweet>, TwitterError> {
        let mut params = list_params(list_owner, list_slug);
        params.push(("count".to_string(), max_count.to_string()));
        params.push(("include_rts".to_string(), "false".to_string()));
        params.push(("include_entities".to_string(), "false".to_string()));
        let body = self
            .request(Method::GET, "lists/statuses.json", params, self.read_auth()?)
            .await?;
        parse_tweets(body)
    }

    async fn list_member_count(
        &self,
        list_owner: &str,
        list_slug: &str,
    ) -> Result<u64, TwitterError> {
        let body = self
            .request(
                Method::GET,
                "lists/show.json",
                list_params(list_owner, list_slug),
                self.read_auth()?,
            )
            .await?;
        body.get("member_count")
            .and_then(Value::as_u64)
            .ok_or_else(|| TwitterError::Decode("missing member_count".to_string()))
    }

    async fn user_timeline(
        &self,
        screen_name: &str,
        max_count: usize,
    ) -> Result<Vec<Tweet>, TwitterError> {
        let params = vec![
            ("screen_name".to_string(), screen_name.to_string()),
            ("count".to_string(), max_count.to_string()),
            ("exclude_replies".to_string(), "true".to_string()),
            ("include_rts".to_string(), "false".to_string()),
        ];
        let body = self
            .request(
                Method::GET,
                "statuses/user_timeline.json",
                params,
                self.read_auth()?,
            )
            .await?;
        parse_tweets(body)
    }

    async fn add_list_member(
        &self,
        list_owner: &str,
        list_slug: &str,
        screen_name: &str,
    ) -> Result<(), TwitterError> {
        let mut params = list_params(list_owner, list_slug);
        params.push(("screen_name".to_string(), screen_name.to_string()));
        self.request(
            Method::POST,
            "lists/members/create.json",
            params,
            self.write_auth()?,
        )
        .await?;
        Ok(())
    }

    async fn remove_list_member(
        &self,
        list_owner: &str,
        list_slug: &str,
        screen_name: &str,
    ) -> Result<(), TwitterError> {
        let mut params = list_params(list_owner, list_slug);
        params.push(("screen_name".to_string(), screen_name.to_string()));
        self.request(
            Method::POST,
            "lists/members/destroy.json",
            params,
            self.write_auth()?,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_prefers_twitter_message() {
        let body = json!({"errors": [{"code": 34, "message": "Sorry, that page does not exist."}]});
        assert_eq!(
            error_from_body(404, &body),
            TwitterError::Api("Sorry, that page does not exist.".to_string())
        );
        assert_eq!(error_from_body(503, &Value::Null), TwitterError::Status(503));
        assert_eq!(
            error_from_body(500, &json!({"errors": []})),
            TwitterError::Status(500)
        );
    }

    #[test]
    fn test_parse_tweets_skips_malformed_entries() {
        let body = json!([
            {"id": 2, "user": {"screen_name": "bob"}},
            {"id": "not a number"},
            {"id": 1, "user": {"screen_name": "amy"}}
        ]);
        let tweets = parse_tweets(body).unwrap();
        assert_eq!(tweets, vec![Tweet::new(2, "bob"), Tweet::new(1, "amy")]);
        assert!(parse_tweets(json!({"errors": []})).is_err());
    }

    #[test]
    fn test_auth_selection() {
        let bearer_only = TwitterClient::new(TwitterConfig {
            bearer_token: Some("token".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(bearer_only.read_auth(), Ok(Auth::Bearer("token"))));
        assert!(matches!(
            bearer_only.write_auth(),
            Err(TwitterError::NotConfigured)
        ));

        let unconfigured = TwitterClient::new(TwitterConfig::default()).unwrap();
        assert!(matches!(
            unconfigured.read_auth(),
            Err(TwitterError::NotConfigured)
        ));

        let user = TwitterClient::new(TwitterConfig {
            consumer_key: Some("ck".to_string()),
            consumer_secret: Some("cs".to_string()),
            access_token: Some("at".to_string()),
            access_token_secret: Some("ats".to_string()),
            api_base: Some("http://localhost:9999/1.1/".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(user.write_auth(), Ok(Auth::User(_))));
        assert_eq!(user.api_base, "http://localhost:9999/1.1");
    }
}
