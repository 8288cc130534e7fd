//! Latest-release feed that signals the monthly update is out
//!
//! The feed is the GitHub "latest release" endpoint of the server modding
//! framework, which ships within hours of the game update on anchor day.

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::constants::release_feed::{ACCEPT_HEADER, REQUEST_TIMEOUT, USER_AGENT};
use crate::errors::RemoteCallError;

#[derive(Debug, Deserialize)]
struct LatestRelease {
    published_at: Option<DateTime<Utc>>,
}

pub struct ReleaseFeed {
    url: String,
    client: Client,
}

impl ReleaseFeed {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Publish time of the latest release
    pub async fn latest_published_at(&self) -> Result<DateTime<Utc>, RemoteCallError> {
        let operation = format!("GET {}", self.url);

        let response = self.client
            .get(&self.url)
            .header("Accept", ACCEPT_HEADER)
            .send()
            .await
            .map_err(|e| RemoteCallError::transport(&operation, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteCallError::status(&operation, status, body));
        }

        let release: LatestRelease = response.json().await
            .map_err(|e| RemoteCallError::invalid_response(&operation, e))?;

        release.published_at
            .ok_or_else(|| RemoteCallError::invalid_response(&operation, "missing published_at"))
    }
}
