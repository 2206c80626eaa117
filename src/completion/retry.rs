use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use super::CompletionClient;
use crate::error::CompletionError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis((base as u64).min(self.max_delay_ms))
    }
}

/// Applies a per-attempt timeout and retries retryable failures with backoff.
pub struct RetryingClient<T: CompletionClient> {
    inner: T,
    config: RetryConfig,
}

impl<T: CompletionClient> RetryingClient<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl<T: CompletionClient> CompletionClient for RetryingClient<T> {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<String, CompletionError> {
        let mut attempt = 0;

        loop {
            let outcome = tokio::time::timeout(timeout, self.inner.complete(prompt, model, timeout))
                .await
                .unwrap_or(Err(CompletionError::Timeout));

            let error = match outcome {
                Ok(text) => return Ok(text),
                Err(e) => e,
            };

            if attempt >= self.config.max_retries || !error.is_retryable() {
                return Err(error);
            }

            let delay = self.config.delay_for(attempt);
            warn!(
                attempt = attempt + 1,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying completion request"
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
