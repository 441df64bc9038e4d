//! Provider Module
//!
//! Clients for the three external services a voice turn depends on:
//! Deepgram (speech-to-text), Groq (chat completion) and Cartesia
//! (text-to-speech). Each sits behind a trait so the turn handler only sees
//! the capability, not the vendor.

pub mod cartesia;
pub mod deepgram;
pub mod error;
pub mod groq;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use cartesia::CartesiaSynthesizer;
pub use deepgram::DeepgramTranscriber;
pub use error::{ProviderError, Result};
pub use groq::GroqChat;
pub use types::{AudioStream, ChatMessage, ChatRole, SpeechAudio};

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Speech-to-text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio clip. Returns the provider's transcript untrimmed.
    async fn transcribe(&self, audio: Bytes, mime_type: Option<&str>) -> Result<String>;
}

/// Chat completion
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Submit the full message list and return the first choice's text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Text-to-speech
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Start synthesis. Non-success statuses surface as `ProviderError::Api`
    /// carrying the provider's error body.
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio>;
}

/// HTTP client shared by all providers for the life of the process.
///
/// No total request timeout: the synthesis body is streamed to the caller
/// for as long as it takes.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .pool_idle_timeout(DEFAULT_POOL_IDLE_TIMEOUT)
        .user_agent(concat!("swift-voice/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}
