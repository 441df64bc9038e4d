//! Deepgram Speech-to-Text
//!
//! Pre-recorded transcription via `POST /v1/listen`. The audio is sent as the
//! raw request body with its declared MIME type.

use super::error::{api_error, ProviderError, Result};
use super::Transcriber;
use crate::config::{SecretString, TranscriptionConfig};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;

const PROVIDER: &str = "Deepgram";
const DEEPGRAM_API_URL: &str = "https://api.deepgram.com";
const DEFAULT_MODEL: &str = "nova-3";
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Deepgram transcription client
#[derive(Clone)]
pub struct DeepgramTranscriber {
    api_key: SecretString,
    client: Client,
    base_url: String,
    model: String,
    smart_format: bool,
}

impl DeepgramTranscriber {
    pub fn new(api_key: SecretString, client: Client) -> Self {
        Self {
            api_key,
            client,
            base_url: DEEPGRAM_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            smart_format: true,
        }
    }

    pub fn from_config(config: &TranscriptionConfig, api_key: SecretString, client: Client) -> Self {
        Self::new(api_key, client)
            .with_base_url(config.base_url.clone())
            .with_model(config.model.clone())
            .with_smart_format(config.smart_format)
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_smart_format(mut self, smart_format: bool) -> Self {
        self.smart_format = smart_format;
        self
    }

    fn listen_url(&self) -> String {
        format!("{}/v1/listen", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Transcriber for DeepgramTranscriber {
    async fn transcribe(&self, audio: Bytes, mime_type: Option<&str>) -> Result<String> {
        let audio_len = audio.len();
        let smart_format = if self.smart_format { "true" } else { "false" };

        let response = self
            .client
            .post(self.listen_url())
            .query(&[("model", self.model.as_str()), ("smart_format", smart_format)])
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", self.api_key.expose_secret()),
            )
            .header(
                reqwest::header::CONTENT_TYPE,
                mime_type.unwrap_or(FALLBACK_MIME_TYPE),
            )
            .body(audio)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        let body: ListenResponse = response.json().await.map_err(|e| ProviderError::Parse {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        let transcript = body.first_transcript().to_string();
        tracing::info!(
            "Deepgram STT: transcribed {} bytes into {} chars",
            audio_len,
            transcript.len()
        );

        Ok(transcript)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListenResponse {
    #[serde(default)]
    results: Option<ListenResults>,
}

#[derive(Debug, Default, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<Channel>,
}

#[derive(Debug, Default, Deserialize)]
struct Channel {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Default, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

impl ListenResponse {
    /// First alternative of the first channel, or `""` when any level is missing.
    fn first_transcript(&self) -> &str {
        self.results
            .as_ref()
            .and_then(|r| r.channels.first())
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.as_str())
            .unwrap_or("")
    }
}
