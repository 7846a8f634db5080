//! Shared HTTP plumbing: client construction and retry with exponential backoff.
//!
//! Only transient failures are retried: timeouts, connection errors, 408, 429
//! and 5xx responses. Everything else is returned to the caller immediately.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Request, Response, StatusCode};

use crate::config::HttpSettings;

const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&HttpSettings::default())
    }
}

impl From<&HttpSettings> for RetryPolicy {
    fn from(settings: &HttpSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_delay: Duration::from_millis(settings.initial_backoff_ms),
            max_delay: Duration::from_millis(settings.max_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// No retries at all; the first outcome is final.
    pub fn none() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// initial_delay * 2^attempt, capped at max_delay.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Send `request`, retrying transient failures according to `policy`.
///
/// A retryable status on the final attempt is returned as a response, not an
/// error, so the caller can report the status it saw.
pub async fn send_with_retry(
    client: &Client,
    request: Request,
    policy: &RetryPolicy,
) -> Result<Response, reqwest::Error> {
    let mut attempt = 0;

    loop {
        let Some(this_try) = request.try_clone() else {
            // Streaming bodies cannot be replayed.
            return client.execute(request).await;
        };

        let last = attempt >= policy.max_retries;

        match client.execute(this_try).await {
            Ok(response) if !last && is_retryable_status(response.status()) => {
                tracing::warn!(
                    status = %response.status(),
                    attempt = attempt + 1,
                    "retryable status from {}",
                    request.url().host_str().unwrap_or_default()
                );
            }
            Ok(response) => {
                if attempt > 0 {
                    tracing::info!("request succeeded after {} retries", attempt);
                }
                return Ok(response);
            }
            Err(e) if !last && is_retryable_error(&e) => {
                tracing::warn!(attempt = attempt + 1, "retryable transport error: {e}");
            }
            Err(e) => return Err(e),
        }

        let delay = policy.delay_for_attempt(attempt);
        tracing::debug!("waiting {:?} before retry {}", delay, attempt + 1);
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Keep error messages readable when a provider returns a large error page.
pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
