//! HTTP client for the clock daemon's API.

pub mod types;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;

use types::AlarmStatus;

/// Base URL the daemon listens on by default.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7790";

pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v0{}", self.base_url, path)
    }

    pub async fn get_status(&self) -> Result<AlarmStatus> {
        let url = self.url("/status");
        let status = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()?
            .json()
            .await?;
        Ok(status)
    }

    /// Queue a press of the named button (`mode-toggle`, `increment`, ...).
    pub async fn press(&self, button: &str) -> Result<()> {
        let url = self.url(&format!("/buttons/{button}"));
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        match response.status() {
            StatusCode::NOT_FOUND => bail!("Unknown button: {button}"),
            _ => {
                response.error_for_status()?;
                Ok(())
            }
        }
    }

    /// Silence a ringing alarm.
    pub async fn dismiss(&self) -> Result<()> {
        let url = self.url("/alarm/dismiss");
        self.http
            .post(&url)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()?;
        Ok(())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
