//! GitHub search probe.
//!
//! Counts issues the planning bot commented on recently, across every
//! repository the token can see. The search result's `total_count` is the
//! activity signal; it covers our own attempts too, so the calculator
//! subtracts them. One bounded network call, no retries.

use crate::probe::{ActivityProbe, ProbeError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// GitHub REST API base URL
const GITHUB_API_URL: &str = "https://api.github.com";

/// Default bot whose comments mark planning activity
const DEFAULT_BOT_LOGIN: &str = "traycerai[bot]";

/// Default probe timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the GitHub search probe
#[derive(Debug, Clone)]
pub struct GithubProbeConfig {
    pub api_url: String,
    pub bot_login: String,
    pub timeout: Duration,
}

impl Default for GithubProbeConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            bot_login: DEFAULT_BOT_LOGIN.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Shape of the search response we care about
#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
}

/// Activity probe backed by the GitHub issue search API
pub struct GithubSearchProbe {
    client: Client,
    config: GithubProbeConfig,
    token: Option<String>,
}

impl GithubSearchProbe {
    /// Create a probe. `token` is optional; unauthenticated searches work
    /// but see less and rate-limit sooner.
    pub fn new(config: GithubProbeConfig, token: Option<String>) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("planq/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config, token })
    }

    /// Search query for issues the bot commented on since the cutoff.
    fn build_query(&self, since: DateTime<Utc>) -> String {
        format!(
            "commenter:{} updated:>={}",
            self.config.bot_login,
            since.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }
}

#[async_trait]
impl ActivityProbe for GithubSearchProbe {
    async fn external_activity(&self, since: DateTime<Utc>) -> Result<u64, ProbeError> {
        let url = format!("{}/search/issues", self.config.api_url);
        let query = self.build_query(since);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            // total_count is all we need; keep the page minimal
            .query(&[("q", query.as_str()), ("per_page", "1")]);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        // The client timeout bounds each phase; this bounds the whole call.
        let response = tokio::time::timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| ProbeError::Timeout(self.config.timeout))??;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProbeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProbeError::InvalidResponse(e.to_string()))?;

        log::debug!("GitHub search reported {} active issues", body.total_count);
        Ok(body.total_count)
    }
}
