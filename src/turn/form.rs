//! Inbound form validation
//!
//! Turns the multipart body of `POST /api` into an [`IncomingTurn`]. The
//! checks run as an ordered pipeline so a rejected form always reports the
//! first constraint it broke:
//!
//! 1. the body is readable multipart
//! 2. exactly one non-empty `input` field (text, or a file part)
//! 3. every `message` field is a JSON `{role, content}` object

use axum::extract::Multipart;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use crate::providers::ChatMessage;

const INPUT_FIELD: &str = "input";
const MESSAGE_FIELD: &str = "message";

/// Why a form was rejected. Every variant is answered with `400 Invalid request`.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("malformed multipart body: {0}")]
    Malformed(String),

    #[error("missing `input` field")]
    MissingInput,

    #[error("`input` field given {0} times")]
    DuplicateInput(usize),

    #[error("`input` text is not valid UTF-8")]
    InputNotUtf8,

    #[error("`message` #{index} is a file, expected JSON text")]
    MessageNotText { index: usize },

    #[error("`message` #{index} is invalid: {source}")]
    InvalidMessage {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One multipart part, fully read.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    /// Present when the part was sent as a file upload
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FormField {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: None,
            content_type: None,
            data: Bytes::copy_from_slice(value.as_bytes()),
        }
    }

    pub fn file(name: &str, file_name: &str, content_type: Option<&str>, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: content_type.map(str::to_string),
            data: Bytes::copy_from_slice(data),
        }
    }

    fn is_file(&self) -> bool {
        self.file_name.is_some()
    }
}

/// The user's input for this turn: typed text or a recorded clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInput {
    Text(String),
    Audio {
        bytes: Bytes,
        mime_type: Option<String>,
    },
}

/// Role allowed in caller-supplied history. `system` is not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

/// One prior message of the conversation, replayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryMessage {
    pub role: HistoryRole,
    pub content: String,
}

impl From<HistoryMessage> for ChatMessage {
    fn from(message: HistoryMessage) -> Self {
        match message.role {
            HistoryRole::User => ChatMessage::user(message.content),
            HistoryRole::Assistant => ChatMessage::assistant(message.content),
        }
    }
}

/// A validated request: one input plus the history in conversation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingTurn {
    pub input: TurnInput,
    pub history: Vec<HistoryMessage>,
}

impl IncomingTurn {
    /// Read every part of a multipart body, then validate.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut fields = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormError::Malformed(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| FormError::Malformed(e.body_text()))?;

            fields.push(FormField {
                name,
                file_name,
                content_type,
                data,
            });
        }

        Self::from_fields(fields)
    }

    /// Validate already-read parts. Fields other than `input` and `message`
    /// are ignored.
    pub fn from_fields(fields: Vec<FormField>) -> Result<Self, FormError> {
        let (inputs, rest): (Vec<_>, Vec<_>) =
            fields.into_iter().partition(|f| f.name == INPUT_FIELD);

        let input = Self::validate_input(inputs)?;

        let history = rest
            .into_iter()
            .filter(|f| f.name == MESSAGE_FIELD)
            .enumerate()
            .map(|(index, field)| Self::validate_message(index, field))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { input, history })
    }

    fn validate_input(mut inputs: Vec<FormField>) -> Result<TurnInput, FormError> {
        if inputs.len() > 1 {
            return Err(FormError::DuplicateInput(inputs.len()));
        }
        let field = inputs.pop().ok_or(FormError::MissingInput)?;

        // An empty text value or a zero-byte upload counts as no input at all
        if field.data.is_empty() {
            return Err(FormError::MissingInput);
        }

        if field.is_file() {
            return Ok(TurnInput::Audio {
                bytes: field.data,
                mime_type: field.content_type.filter(|t| !t.is_empty()),
            });
        }

        let text = String::from_utf8(field.data.to_vec()).map_err(|_| FormError::InputNotUtf8)?;
        Ok(TurnInput::Text(text))
    }

    fn validate_message(index: usize, field: FormField) -> Result<HistoryMessage, FormError> {
        if field.is_file() {
            return Err(FormError::MessageNotText { index });
        }
        serde_json::from_slice(&field.data)
            .map_err(|source| FormError::InvalidMessage { index, source })
    }
}
