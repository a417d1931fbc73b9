//! LLM chat-completion client
//!
//! One prompt in, one non-streaming completion out. The response type is
//! lenient: providers that return no choices, no message or a null content
//! still parse, and the caller decides what an empty completion means.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{LlmConfig, UpstreamConfig};
use crate::{Result, WanderError};

const PROVIDER: &str = "OpenAI";

/// Text completion capability
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        model: &str,
    ) -> Result<CompletionResponse>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat-completion response, reduced to what the planner reads
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Response with a single choice carrying `text`
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            choices: Some(vec![Choice {
                message: Some(ChoiceMessage {
                    content: Some(text.into()),
                }),
            }]),
        }
    }

    /// Content of the first choice, if the provider sent any
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .as_deref()?
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
    }
}

/// OpenAI-compatible chat-completion client
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, upstream: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(upstream.timeout_seconds.into()))
            .user_agent(concat!("WanderWise/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        model: &str,
    ) -> Result<CompletionResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| WanderError::config("OPENAI_API_KEY is not set"))?;

        let request = ChatCompletionRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Requesting chat completion from {}", url);
        let start_time = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Chat completion request failed: {}", e);
                WanderError::upstream(PROVIDER, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let payload =
                serde_json::from_str(&body).unwrap_or_else(|_| Value::String(body));
            return Err(WanderError::upstream_response(
                PROVIDER,
                format!("HTTP {status}"),
                status.as_u16(),
                Some(payload),
            ));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            WanderError::upstream_response(
                PROVIDER,
                format!("invalid completion response: {e}"),
                status.as_u16(),
                None,
            )
        })?;

        let total_duration = start_time.elapsed();
        info!(
            "Chat completion finished in {:.3}s",
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow chat completion response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(completion)
    }
}
