use super::{normalize_rows, CardCatalogGateway};
use crate::config::Settings;
use crate::domain::CardRecord;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

// Three attempts with backoff must fit inside the default fetch timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 2;
const DEFAULT_PATH: &str = "/v1/cards/active";
const DEFAULT_RETRIES: u32 = 3;

const GATEWAY_NAME: &str = "external_http_json";

#[derive(Debug, Deserialize)]
struct ActiveCardsResponse {
    cards: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct HttpJsonCatalog {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
    retries: u32,
}

impl HttpJsonCatalog {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_catalog_base_url()?.to_string();
        let api_key = settings.catalog_api_key.clone();

        let timeout_secs = std::env::var("CATALOG_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("CATALOG_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        let path = std::env::var("CATALOG_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        let budget = retry_budget(Duration::from_secs(timeout_secs), retries);
        let fetch_timeout = crate::RecommendOptions::from_env().fetch_timeout;
        if budget > fetch_timeout {
            tracing::warn!(
                ?budget,
                ?fetch_timeout,
                "catalog retries cannot complete before the fetch timeout; lower CATALOG_TIMEOUT_SECS or CATALOG_RETRIES"
            );
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build catalog http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            path,
            retries,
        })
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    async fn fetch_once(&self) -> Result<Vec<Value>> {
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .send()
            .await
            .context("catalog request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read catalog response")?;

        if !status.is_success() {
            anyhow::bail!("catalog HTTP {status}: {text}");
        }

        parse_active_cards(&text)
    }
}

/// Worst-case time for `retries` attempts that each hit the request timeout.
fn retry_budget(per_attempt: Duration, retries: u32) -> Duration {
    let attempts = retries.max(1);
    let backoff: Duration = (1..attempts).map(backoff_for).sum();
    per_attempt * attempts + backoff
}

fn backoff_for(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt - 1))
}

fn parse_active_cards(text: &str) -> Result<Vec<Value>> {
    let parsed = serde_json::from_str::<ActiveCardsResponse>(text)
        .with_context(|| format!("catalog response is not a {{\"cards\": [...]}} document: {text}"))?;
    Ok(parsed.cards)
}

#[async_trait::async_trait]
impl CardCatalogGateway for HttpJsonCatalog {
    fn gateway_name(&self) -> &'static str {
        GATEWAY_NAME
    }

    async fn fetch_active_cards(&self) -> Result<Vec<CardRecord>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once().await {
                Ok(rows) => return Ok(normalize_rows(GATEWAY_NAME, rows)),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = backoff_for(attempt);
                    tracing::warn!(attempt, ?backoff, error = %err, "catalog fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(base_url: &str, path: &str) -> HttpJsonCatalog {
        HttpJsonCatalog {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key: None,
            path: path.to_string(),
            retries: 1,
        }
    }

    #[test]
    fn url_joins_base_and_path() {
        assert_eq!(
            catalog("https://cards.example.com/", "v1/cards/active").url(),
            "https://cards.example.com/v1/cards/active"
        );
        assert_eq!(
            catalog("https://cards.example.com", DEFAULT_PATH).url(),
            "https://cards.example.com/v1/cards/active"
        );
    }

    #[test]
    fn parses_expected_shape_and_tolerates_bad_rows() {
        let body = json!({
            "cards": [
                {"id": "a", "issuer": "Chase", "reward_type": "points", "annual_fee": 95},
                {"id": "b", "annual_fee": "unknown"}
            ]
        })
        .to_string();

        let rows = parse_active_cards(&body).unwrap();
        let cards = normalize_rows(GATEWAY_NAME, rows);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].annual_fee, 95.0);
        assert_eq!(cards[1].annual_fee, 0.0);
    }

    #[test]
    fn default_retries_fit_inside_default_fetch_timeout() {
        let budget = retry_budget(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_RETRIES);
        // 2s + 1s + 2s + 2s + 2s
        assert_eq!(budget, Duration::from_secs(9));
        assert!(budget < crate::RecommendOptions::default().fetch_timeout);

        assert_eq!(retry_budget(Duration::from_secs(30), 3), Duration::from_secs(93));
        assert_eq!(retry_budget(Duration::from_secs(5), 0), Duration::from_secs(5));
    }

    #[test]
    fn rejects_unexpected_document_shape() {
        assert!(parse_active_cards(r#"{"items": []}"#).is_err());
        assert!(parse_active_cards("<html>").is_err());
    }
}
