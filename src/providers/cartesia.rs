//! Cartesia Text-to-Speech
//!
//! `POST /tts/bytes` returning container-less PCM. The response body is handed
//! back unread so the caller can stream it straight through.

use super::error::{api_error, Result};
use super::types::{AudioStream, SpeechAudio};
use super::Synthesizer;
use crate::config::{SecretString, SynthesisConfig};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;

const PROVIDER: &str = "Cartesia";
const CARTESIA_API_URL: &str = "https://api.cartesia.ai";
const CARTESIA_VERSION: &str = "2024-06-30";
const DEFAULT_MODEL_ID: &str = "sonic-3-2025-10-27";
const DEFAULT_VOICE_ID: &str = "b7d50908-b17c-442d-ad8d-810c63997ed9";
const DEFAULT_SAMPLE_RATE: u32 = 24_000;

const OUTPUT_CONTAINER: &str = "raw";
const OUTPUT_ENCODING: &str = "pcm_f32le";

/// Cartesia synthesis client
#[derive(Clone)]
pub struct CartesiaSynthesizer {
    api_key: SecretString,
    client: Client,
    base_url: String,
    api_version: String,
    model_id: String,
    voice_id: String,
    sample_rate: u32,
}

impl CartesiaSynthesizer {
    pub fn new(api_key: SecretString, client: Client) -> Self {
        Self {
            api_key,
            client,
            base_url: CARTESIA_API_URL.to_string(),
            api_version: CARTESIA_VERSION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn from_config(config: &SynthesisConfig, api_key: SecretString, client: Client) -> Self {
        let mut synthesizer = Self::new(api_key, client).with_base_url(config.base_url.clone());
        synthesizer.api_version = config.api_version.clone();
        synthesizer.model_id = config.model_id.clone();
        synthesizer.voice_id = config.voice_id.clone();
        synthesizer.sample_rate = config.sample_rate;
        synthesizer
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_voice(mut self, voice_id: String) -> Self {
        self.voice_id = voice_id;
        self
    }

    fn bytes_url(&self) -> String {
        format!("{}/tts/bytes", self.base_url.trim_end_matches('/'))
    }

    fn request_body<'a>(&'a self, transcript: &'a str) -> TtsRequest<'a> {
        TtsRequest {
            model_id: &self.model_id,
            transcript,
            voice: VoiceSelector {
                mode: "id",
                id: &self.voice_id,
            },
            output_format: OutputFormat {
                container: OUTPUT_CONTAINER,
                encoding: OUTPUT_ENCODING,
                sample_rate: self.sample_rate,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model_id: &'a str,
    transcript: &'a str,
    voice: VoiceSelector<'a>,
    output_format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct VoiceSelector<'a> {
    mode: &'static str,
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct OutputFormat {
    container: &'static str,
    encoding: &'static str,
    sample_rate: u32,
}

#[async_trait]
impl Synthesizer for CartesiaSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        let response = self
            .client
            .post(self.bytes_url())
            .header("Cartesia-Version", &self.api_version)
            .header("X-API-Key", self.api_key.expose_secret())
            .json(&self.request_body(text))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        tracing::info!(
            "Cartesia TTS: streaming {} chars of speech (voice={}, model={})",
            text.len(),
            self.voice_id,
            self.model_id
        );

        let stream: AudioStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(std::io::Error::other)),
        );

        Ok(SpeechAudio {
            content_type,
            stream,
        })
    }
}
