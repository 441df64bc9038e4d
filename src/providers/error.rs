//! Provider error types

use thiserror::Error;

/// Errors from the transcription, completion and synthesis clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("{provider} returned {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Failed to parse {provider} response: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },

    /// Completion contained no choice with text content
    #[error("Completion returned no message content")]
    EmptyCompletion,

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ProviderError {
    /// Upstream HTTP status, when the provider sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Read a non-success response into `ProviderError::Api`.
pub(crate) async fn api_error(provider: &'static str, response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Api {
        provider,
        status,
        body,
    }
}
