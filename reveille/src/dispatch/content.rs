//! Where the wake-up message comes from.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{ContentProvider, DispatchError};

/// Built-in wake-up lines.
pub const GREETINGS: [&str; 4] = [
    "Good morning! Time to start your day.",
    "Rise and shine! A new day awaits.",
    "Wake up! Your adventures begin now.",
    "Hello world! Time to be productive.",
];

/// Rotates through [`GREETINGS`]. Never fails.
#[derive(Debug, Default)]
pub struct GreetingProvider {
    next: AtomicUsize,
}

impl GreetingProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentProvider for GreetingProvider {
    async fn fetch_message(&self) -> Result<String, DispatchError> {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % GREETINGS.len();
        Ok(GREETINGS[i].to_string())
    }
}

/// Fetches the message as plain text from an HTTP endpoint, e.g. a
/// service that serves today's headlines.
///
/// The body is used as-is, trimmed. An empty body counts as a failure.
#[derive(Debug, Clone)]
pub struct HttpTextProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpTextProvider {
    pub fn new(url: impl Into<String>) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reveille/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ContentProvider for HttpTextProvider {
    async fn fetch_message(&self) -> Result<String, DispatchError> {
        let unavailable = |e: reqwest::Error| DispatchError::ContentUnavailable(e.to_string());

        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .text()
            .await
            .map_err(unavailable)?;

        let text = body.trim();
        if text.is_empty() {
            return Err(DispatchError::ContentUnavailable(format!(
                "empty response from {}",
                self.url
            )));
        }
        Ok(text.to_string())
    }
}
