use anyhow::Context;
use chrono::{Duration as ChronoDuration, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{EnvConfig, ProviderConfig};
use crate::data::cache::{request_signature, ResponseCache};
use crate::data::coerce::as_int;
use crate::data::resolver::{field, Field};
use crate::data::types::{DateWindow, RawRecord};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API_SPORTS_KEY is not set")]
    MissingApiKey,

    #[error("request to {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("{path} reported errors: {errors}")]
    Api { path: String, errors: String },
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// API-Football v3 client. Responses are cached by request signature.
pub struct ApiSportsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    cache: Arc<ResponseCache>,
    live_ttl: Duration,
}

impl ApiSportsClient {
    pub fn new(env: &EnvConfig, provider: &ProviderConfig, cache: Arc<ResponseCache>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(provider.request_timeout_secs))
            .build()
            .context("Failed to build API-Sports HTTP client")?;

        Ok(Self {
            client,
            base_url: env.api_sports_url.trim_end_matches('/').to_string(),
            api_key: env.api_sports_key.clone(),
            cache,
            live_ttl: Duration::from_secs(provider.live_cache_ttl_secs),
        })
    }

    /// Fixtures scheduled on one calendar date.
    pub async fn fixtures_on(&self, date: NaiveDate) -> ProviderResult<Vec<RawRecord>> {
        self.get_list("fixtures", &[("date", date.format("%Y-%m-%d").to_string())], None)
            .await
    }

    /// Fixtures currently in play.
    pub async fn live_fixtures(&self) -> ProviderResult<Vec<RawRecord>> {
        self.get_list("fixtures", &[("live", "all".to_string())], Some(self.live_ttl))
            .await
    }

    /// Live fixtures followed by every fixture from `start` through `days_forward` days later.
    ///
    /// A failed live call is logged and skipped; a failed date call is an error.
    pub async fn fixtures_for_window(
        &self,
        start: NaiveDate,
        days_forward: u32,
    ) -> ProviderResult<(Vec<RawRecord>, DateWindow)> {
        let window = DateWindow {
            from: start,
            to: start + ChronoDuration::days(i64::from(days_forward)),
        };

        let mut batches = Vec::with_capacity(days_forward as usize + 2);
        match self.live_fixtures().await {
            Ok(live) => batches.push(live),
            Err(e) => warn!("live fixtures unavailable: {}", e),
        }

        let mut day = window.from;
        while day <= window.to {
            batches.push(self.fixtures_on(day).await?);
            day += ChronoDuration::days(1);
        }

        Ok((merge_unique_fixtures(batches), window))
    }

    pub async fn fixture(&self, fixture_id: i64) -> ProviderResult<Option<RawRecord>> {
        let mut items = self
            .get_list("fixtures", &[("id", fixture_id.to_string())], Some(self.live_ttl))
            .await?;
        Ok(if items.is_empty() { None } else { Some(items.swap_remove(0)) })
    }

    pub async fn fixture_statistics(&self, fixture_id: i64) -> ProviderResult<Value> {
        let items = self
            .get_list("fixtures/statistics", &[("fixture", fixture_id.to_string())], Some(self.live_ttl))
            .await?;
        Ok(Value::Array(items))
    }

    pub async fn fixture_events(&self, fixture_id: i64) -> ProviderResult<Value> {
        let items = self
            .get_list("fixtures/events", &[("fixture", fixture_id.to_string())], Some(self.live_ttl))
            .await?;
        Ok(Value::Array(items))
    }

    /// One player's record with season statistics.
    pub async fn player(&self, player_id: i64, season: i32) -> ProviderResult<Option<RawRecord>> {
        let mut items = self
            .get_list(
                "players",
                &[("id", player_id.to_string()), ("season", season.to_string())],
                None,
            )
            .await?;
        Ok(if items.is_empty() { None } else { Some(items.swap_remove(0)) })
    }

    /// First page of a team's squad for the season.
    pub async fn squad_players(&self, team_id: i64, season: i32) -> ProviderResult<Vec<RawRecord>> {
        self.get_list(
            "players",
            &[("team", team_id.to_string()), ("season", season.to_string())],
            None,
        )
        .await
    }

    async fn get_list(
        &self,
        path: &str,
        params: &[(&str, String)],
        ttl: Option<Duration>,
    ) -> ProviderResult<Vec<RawRecord>> {
        let signature = request_signature(path, params);
        if let Some(cached) = self.cache.get(&signature) {
            debug!(%signature, "provider cache hit");
            return unwrap_envelope(path, cached);
        }

        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("x-apisports-key", api_key)
            .query(params)
            .send()
            .await
            .map_err(|source| ProviderError::Http { path: path.to_string(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|source| ProviderError::Http { path: path.to_string(), source })?;

        // Validate before caching so error bodies are retried next time.
        let items = unwrap_envelope(path, body.clone())?;
        match ttl {
            Some(ttl) => self.cache.insert_with_ttl(signature, body, ttl),
            None => self.cache.insert(signature, body),
        }
        Ok(items)
    }
}

/// Pull the `response` list out of a provider body.
///
/// `errors` may be an empty list, an empty object, or a map of messages; only a
/// non-empty value counts as a failure.
pub fn unwrap_envelope(path: &str, body: Value) -> ProviderResult<Vec<RawRecord>> {
    let has_errors = match body.get("errors") {
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::String(s)) => !s.trim().is_empty(),
        _ => false,
    };
    if has_errors {
        let errors = body.get("errors").map(Value::to_string).unwrap_or_default();
        return Err(ProviderError::Api { path: path.to_string(), errors });
    }

    Ok(match body {
        Value::Object(mut map) => match map.remove("response") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(single) => vec![single],
        },
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

/// Concatenate fixture batches, keeping the first record seen for each fixture id.
/// Records without an id are kept as they come.
pub fn merge_unique_fixtures(batches: Vec<Vec<RawRecord>>) -> Vec<RawRecord> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|record| match field(record, Field::FixtureId) {
            Some(id) => seen.insert(as_int(Some(id), -1)),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(key: Option<&str>) -> EnvConfig {
        EnvConfig {
            api_sports_key: key.map(str::to_string),
            api_sports_url: "http://127.0.0.1:9/".to_string(),
            session_id: "test".to_string(),
        }
    }

    fn provider() -> ProviderConfig {
        ProviderConfig {
            request_timeout_secs: 1,
            cache_ttl_secs: 60,
            live_cache_ttl_secs: 8,
        }
    }

    #[test]
    fn test_unwrap_envelope() {
        let body = json!({ "errors": [], "results": 2, "response": [{ "fixture": { "id": 1 } }, { "fixture": { "id": 2 } }] });
        assert_eq!(unwrap_envelope("fixtures", body).unwrap().len(), 2);

        let empty_map_errors = json!({ "errors": {}, "response": [] });
        assert!(unwrap_envelope("fixtures", empty_map_errors).unwrap().is_empty());

        assert!(unwrap_envelope("fixtures", json!({ "response": null })).unwrap().is_empty());
    }

    #[test]
    fn test_unwrap_envelope_reports_errors() {
        let body = json!({ "errors": { "token": "Error/Missing application key." }, "response": [] });
        match unwrap_envelope("fixtures", body) {
            Err(ProviderError::Api { path, errors }) => {
                assert_eq!(path, "fixtures");
                assert!(errors.contains("Missing application key"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_unique_fixtures_keeps_first_seen() {
        let live = vec![json!({ "fixture": { "id": 10, "status": { "short": "2H" } } })];
        let today = vec![
            json!({ "fixture": { "id": 10, "status": { "short": "NS" } } }),
            json!({ "fixture": { "id": 11 } }),
        ];
        let tomorrow = vec![json!({ "fixture": { "id": 12 } }), json!({ "teams": {} })];

        let merged = merge_unique_fixtures(vec![live, today, tomorrow]);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged[0]["fixture"]["status"]["short"], "2H");
        assert_eq!(merged[2]["fixture"]["id"], 12);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_io() {
        let client = ApiSportsClient::new(&env(None), &provider(), Arc::new(ResponseCache::default())).unwrap();
        let err = client.live_fixtures().await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_cached_response_is_served_without_key() {
        let cache = Arc::new(ResponseCache::default());
        cache.insert(
            request_signature("fixtures/events", &[("fixture", "77".to_string())]),
            json!({ "errors": [], "response": [{ "type": "Goal", "time": { "elapsed": 12 } }] }),
        );
        let client = ApiSportsClient::new(&env(None), &provider(), cache).unwrap();

        let events = client.fixture_events(77).await.unwrap();
        assert_eq!(events.as_array().map(Vec::len), Some(1));
    }
}
