//! Gemini API client
//!
//! Implements the completion boundary against Google's Generative Language API.
//! Uses a long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::completion::CompletionClient;
use crate::error::CompletionError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const SYSTEM_PROMPT: &str = r#"You are an experienced accountant and financial analyst assisting a small business.

Guidelines:
- Base every figure on the data provided; never invent numbers
- Say clearly when data is missing and what would be needed
- Be structured and concise, using short sections and bullet points
- Use professional accounting language"#;

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> crate::Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<String, CompletionError> {
        if self.api_key.is_empty() {
            return Err(CompletionError::AuthError(
                "GOOGLE_AI_STUDIO_API_KEY not configured".to_string(),
            ));
        }

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 2048,
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
        };

        debug!(model, prompt_len = prompt.len(), "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::TransientError(format!("Gemini API error: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(classify_status(status, error_text));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::TransientError(format!("Gemini parse error: {}", e))
            }
        })?;

        let answer = extract_text(&gemini_response)?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini response received"
            );
        }

        Ok(answer)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Map a non-success HTTP status to the completion error taxonomy
fn classify_status(status: StatusCode, body: String) -> CompletionError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CompletionError::AuthError(body),
        StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => CompletionError::Timeout,
        _ => CompletionError::TransientError(format!("Gemini API returned {}: {}", status, body)),
    }
}

fn extract_text(response: &GeminiResponse) -> Result<String, CompletionError> {
    let candidate = response.candidates.first().ok_or_else(|| {
        CompletionError::TransientError("No response from Gemini API".to_string())
    })?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(CompletionError::TransientError(
            "Gemini blocked the response for safety reasons".to_string(),
        ));
    }

    let text: String = candidate
        .content
        .parts
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(CompletionError::TransientError(
            "Empty response from Gemini".to_string(),
        ));
    }

    Ok(text)
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i32,
    #[serde(default)]
    candidates_token_count: i32,
}
