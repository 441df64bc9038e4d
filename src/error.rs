//! Turn errors and their HTTP responses
//!
//! Every failure of a turn ends the request with a fixed plain-text body.
//! Nothing from upstream providers is echoed back to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::providers::ProviderError;
use crate::turn::form::FormError;

pub const INVALID_REQUEST_BODY: &str = "Invalid request";
pub const INVALID_AUDIO_BODY: &str = "Invalid audio";
pub const SYNTHESIS_FAILED_BODY: &str = "Voice synthesis failed";
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum TurnError {
    /// The form did not match `{input, message*}`
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] FormError),

    /// No usable transcript could be resolved from the input
    #[error("Invalid audio")]
    InvalidAudio,

    /// The synthesis provider answered with a non-success status
    #[error("Voice synthesis failed with status {status}")]
    SynthesisFailed { status: u16 },

    /// A provider call failed outside the handled cases
    #[error("Upstream provider failed: {0}")]
    Upstream(#[from] ProviderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TurnError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidAudio => StatusCode::BAD_REQUEST,
            Self::SynthesisFailed { .. } | Self::Upstream(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Fixed response body for this error class.
    pub fn body(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => INVALID_REQUEST_BODY,
            Self::InvalidAudio => INVALID_AUDIO_BODY,
            Self::SynthesisFailed { .. } => SYNTHESIS_FAILED_BODY,
            Self::Upstream(_) | Self::Internal(_) => INTERNAL_ERROR_BODY,
        }
    }
}

impl IntoResponse for TurnError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Turn failed: {}", self);
        } else {
            tracing::warn!("Turn rejected: {}", self);
        }
        (status, self.body()).into_response()
    }
}
