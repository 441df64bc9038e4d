//! Voice turn handler
//!
//! `ValidateInput -> ResolveTranscript -> RequestCompletion -> RequestSynthesis -> StreamResponse`
//!
//! Strictly sequential: each step needs the previous step's output. Nothing
//! is retried and nothing outlives the request.

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};

use super::caller::CallerContext;
use super::form::{FormError, IncomingTurn, TurnInput};
use super::prompt::{build_messages, system_prompt};
use super::timing::{timed_stream, PhaseTimer};
use crate::error::TurnError;
use crate::providers::{ProviderError, Transcriber};
use crate::server::AppState;
use crate::utils::{encode_uri_component, truncate_str};

pub const TRANSCRIPT_HEADER: HeaderName = HeaderName::from_static("x-transcript");
pub const RESPONSE_HEADER: HeaderName = HeaderName::from_static("x-response");

const LOG_PREVIEW_BYTES: usize = 80;

/// `POST /api`
pub async fn handle_turn(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, TurnError> {
    let caller = CallerContext::from_headers(&headers);
    let transcribe_timer = PhaseTimer::start("transcribe", &caller.request_id);

    let multipart = multipart.map_err(|e| FormError::Malformed(e.body_text()))?;
    let turn = IncomingTurn::from_multipart(multipart).await?;

    run_turn(&state, &caller, turn, transcribe_timer).await
}

/// Everything after form validation.
pub async fn run_turn(
    state: &AppState,
    caller: &CallerContext,
    turn: IncomingTurn,
    transcribe_timer: PhaseTimer,
) -> Result<Response, TurnError> {
    let request_id = caller.request_id.as_str();

    let transcript = resolve_transcript(state.transcriber.as_ref(), turn.input, request_id)
        .await
        .ok_or(TurnError::InvalidAudio)?;
    transcribe_timer.finish();

    tracing::debug!(
        "[{}] transcript: {:?}",
        request_id,
        truncate_str(&transcript, LOG_PREVIEW_BYTES)
    );

    // Completion
    let completion_timer = PhaseTimer::start("text completion", request_id);
    let system = system_prompt(&caller.location(), &caller.local_time());
    let messages = build_messages(system, turn.history, &transcript);
    let reply = state.completer.complete(&messages).await?;
    completion_timer.finish();

    tracing::debug!(
        "[{}] reply: {:?}",
        request_id,
        truncate_str(&reply, LOG_PREVIEW_BYTES)
    );

    // Synthesis
    let synthesis_timer = PhaseTimer::start("synthesis request", request_id);
    let audio = match state.synthesizer.synthesize(&reply).await {
        Ok(audio) => audio,
        Err(ProviderError::Api { status, body, .. }) => {
            tracing::error!("[{}] synthesis rejected ({}): {}", request_id, status, body);
            return Err(TurnError::SynthesisFailed { status });
        }
        Err(e) => return Err(e.into()),
    };
    synthesis_timer.finish();

    // Stream
    let stream_timer = PhaseTimer::start("stream", request_id);
    let body = Body::from_stream(timed_stream(audio.stream, stream_timer));

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(TRANSCRIPT_HEADER, encoded_header(&transcript)?);
    headers.insert(RESPONSE_HEADER, encoded_header(&reply)?);
    if let Some(content_type) = audio.content_type
        && let Ok(value) = HeaderValue::from_str(&content_type)
    {
        headers.insert(header::CONTENT_TYPE, value);
    }

    Ok(response)
}

/// Text input is used as-is. Audio goes through the transcriber; any failure
/// there, or a blank result, means there is no transcript.
pub async fn resolve_transcript(
    transcriber: &dyn Transcriber,
    input: TurnInput,
    request_id: &str,
) -> Option<String> {
    match input {
        TurnInput::Text(text) => Some(text).filter(|t| !t.is_empty()),
        TurnInput::Audio { bytes, mime_type } => {
            match transcriber.transcribe(bytes, mime_type.as_deref()).await {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        tracing::warn!("[{}] transcription came back empty", request_id);
                        None
                    } else {
                        Some(trimmed.to_string())
                    }
                }
                Err(e) => {
                    tracing::warn!("[{}] transcription failed: {}", request_id, e);
                    None
                }
            }
        }
    }
}

fn encoded_header(value: &str) -> Result<HeaderValue, TurnError> {
    HeaderValue::from_str(&encode_uri_component(value))
        .map_err(|e| TurnError::Internal(format!("unencodable header value: {e}")))
}
