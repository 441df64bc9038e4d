//! In-memory providers for handler and router tests.

use super::error::{ProviderError, Result};
use super::types::{ChatMessage, SpeechAudio};
use super::{ChatCompleter, Synthesizer, Transcriber};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transcriber returning a canned result and recording what it was sent.
pub struct MockTranscriber {
    reply: Mutex<Option<Result<String>>>,
    pub calls: AtomicUsize,
    pub last_mime_type: Mutex<Option<String>>,
}

impl MockTranscriber {
    pub fn returning(transcript: &str) -> Self {
        Self::with_result(Ok(transcript.to_string()))
    }

    pub fn failing(status: u16) -> Self {
        Self::with_result(Err(ProviderError::Api {
            provider: "mock",
            status,
            body: "mock transcription failure".to_string(),
        }))
    }

    pub fn failing_with(error: ProviderError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<String>) -> Self {
        Self {
            reply: Mutex::new(Some(result)),
            calls: AtomicUsize::new(0),
            last_mime_type: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio: Bytes, mime_type: Option<&str>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_mime_type.lock().unwrap() = mime_type.map(str::to_string);
        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ProviderError::EmptyCompletion))
    }
}

/// Completer returning a fixed reply and recording the messages it saw.
pub struct MockCompleter {
    reply: Option<String>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<ChatMessage>>,
}

impl MockCompleter {
    pub fn returning(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_messages(&self) -> Vec<ChatMessage> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompleter for MockCompleter {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = messages.to_vec();
        self.reply.clone().ok_or(ProviderError::EmptyCompletion)
    }
}

/// Synthesizer streaming fixed chunks, or rejecting with a status.
pub struct MockSynthesizer {
    chunks: Vec<Bytes>,
    reject_status: Option<u16>,
    pub calls: AtomicUsize,
    pub last_text: Mutex<Option<String>>,
}

impl MockSynthesizer {
    pub fn streaming(chunks: &[&'static [u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| Bytes::from_static(c)).collect(),
            reject_status: None,
            calls: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        }
    }

    pub fn rejecting(status: u16) -> Self {
        Self {
            chunks: Vec::new(),
            reject_status: Some(status),
            calls: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(text.to_string());

        if let Some(status) = self.reject_status {
            return Err(ProviderError::Api {
                provider: "mock",
                status,
                body: r#"{"error":"voice not found"}"#.to_string(),
            });
        }

        let chunks: Vec<std::io::Result<Bytes>> = self.chunks.iter().cloned().map(Ok).collect();
        Ok(SpeechAudio {
            content_type: None,
            stream: Box::pin(futures::stream::iter(chunks)),
        })
    }
}

/// Base URL of a local port with nothing listening on it.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// A real transport error, from a request to [`unreachable_url`].
pub async fn transport_error() -> ProviderError {
    let url = unreachable_url().await;
    reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map(|_| ())
        .unwrap_err()
        .into()
}
