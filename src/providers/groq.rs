//! Groq Chat Completions
//!
//! OpenAI-compatible `POST /chat/completions`, awaited in full (no token
//! streaming). The reply is the first choice's message content.

use super::error::{api_error, ProviderError, Result};
use super::types::ChatMessage;
use super::ChatCompleter;
use crate::config::{CompletionConfig, SecretString};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "Groq";
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "moonshotai/kimi-k2-instruct-0905";

/// Groq chat completion client
#[derive(Clone)]
pub struct GroqChat {
    api_key: SecretString,
    client: Client,
    base_url: String,
    model: String,
}

impl GroqChat {
    pub fn new(api_key: SecretString, client: Client) -> Self {
        Self {
            api_key,
            client,
            base_url: GROQ_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn from_config(config: &CompletionConfig, api_key: SecretString, client: Client) -> Self {
        Self::new(api_key, client)
            .with_base_url(config.base_url.clone())
            .with_model(config.model.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatCompleter for GroqChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        let body: CompletionResponse = response.json().await.map_err(|e| ProviderError::Parse {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        let reply = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyCompletion)?;

        tracing::info!(
            "Groq completion: {} messages in, {} chars out (model={})",
            messages.len(),
            reply.len(),
            self.model
        );

        Ok(reply)
    }
}
