// HTTP client for the game's public ninja data feed.

use std::time::{Duration, Instant};

use reqwest::{header, Client};

use crate::config::Config;
use crate::error::{LookupError, Result};
use crate::metrics;
use crate::model::{parse_detail, parse_index, EntityDetail, NameIndexEntry};

/// Feed endpoints plus the headers the site expects from a browser.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Directory holding `ninja_list.json` and `{id}.json`.
    pub base_url: String,
    pub user_agent: String,
    pub referer: String,
    pub timeout: Duration,
}

impl From<&Config> for FeedConfig {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.feed_base_url.clone(),
            user_agent: config.user_agent.clone(),
            referer: config.referer.clone(),
            timeout: config.timeout,
        }
    }
}

/// Read-only access to the name index and per-ninja detail records.
#[derive(Debug, Clone)]
pub struct NinjaFeed {
    base_url: String,
    client: Client,
}

impl NinjaFeed {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_str(&config.referer)
                .map_err(|e| LookupError::Malformed(format!("invalid referer header: {e}")))?,
        );

        let client = Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn index_url(&self) -> String {
        format!("{}/ninja_list.json", self.base_url)
    }

    pub fn detail_url(&self, id: &str) -> String {
        format!("{}/{}.json", self.base_url, id)
    }

    /// Fetch the full name index in feed order.
    pub async fn fetch_index(&self) -> Result<Vec<NameIndexEntry>> {
        let url = self.index_url();
        tracing::info!("Requesting ninja list: {url}");
        let body = self.get_text("index", &url).await?;
        let entries = parse_index(&body);
        record_outcome("index", &entries);
        entries
    }

    /// Fetch and parse one ninja's detail record.
    pub async fn fetch_detail(&self, id: &str) -> Result<EntityDetail> {
        let url = self.detail_url(id);
        tracing::info!("Requesting ninja detail: {url}");
        let body = self.get_text("detail", &url).await?;
        let detail = parse_detail(&body);
        record_outcome("detail", &detail);
        detail
    }

    /// Download raw bytes (avatars). Only a 200 response counts as success.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(LookupError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_text(&self, endpoint: &str, url: &str) -> Result<String> {
        let started = Instant::now();
        let result = self.send_get(url).await;
        metrics::FEED_REQUEST_DURATION_SECONDS
            .with_label_values(&[endpoint])
            .observe(started.elapsed().as_secs_f64());
        if let Err(e) = &result {
            let outcome = match e {
                LookupError::Status { .. } => "status",
                _ => "network",
            };
            metrics::FEED_REQUESTS_TOTAL
                .with_label_values(&[endpoint, outcome])
                .inc();
        }
        result
    }

    async fn send_get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::info!("Feed HTTP status {status} for {url}");
        if !status.is_success() {
            return Err(LookupError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

fn record_outcome<T>(endpoint: &str, result: &Result<T>) {
    let outcome = if result.is_ok() { "ok" } else { "malformed" };
    metrics::FEED_REQUESTS_TOTAL
        .with_label_values(&[endpoint, outcome])
        .inc();
}
