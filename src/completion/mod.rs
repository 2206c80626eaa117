//! AI-completion boundary
//!
//! Agents only see the `CompletionClient` trait. Production wires a
//! `RetryingClient<GeminiClient>`; demo mode wires the `CannedClient`.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CompletionError;

pub mod canned;
pub mod retry;

pub use canned::CannedClient;
pub use retry::{RetryConfig, RetryingClient};

/// Trait for a text completion service
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<String, CompletionError>;

    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<String, CompletionError> {
        (**self).complete(prompt, model, timeout).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
