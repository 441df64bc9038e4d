//! Prompt assembly
//!
//! The completion request is always: one system message, the caller's
//! history in order, then the transcript as the final user message.

use super::form::HistoryMessage;
use crate::providers::ChatMessage;

/// Assistant instructions. `{location}` and `{time}` are filled per request.
const SYSTEM_TEMPLATE: &str = "\
- You are Swift, a friendly and helpful voice assistant.
- Respond briefly to the user's request, and do not provide unnecessary information.
- If you don't understand the user's request, ask for clarification.
- You do not have access to up-to-date information, so you should not provide real-time data.
- You are not capable of performing actions other than responding to the user.
- Do not use markdown, emojis, or other formatting in your responses. Respond in a way easily spoken by text-to-speech software.
- User location is {location}.
- The current time is {time}.
- Your large language model is kimi-k2. It is hosted on Groq, an AI infrastructure company that builds fast inference technology.
- Your text-to-speech model is Sonic, created and hosted by Cartesia, a company that builds fast and realistic speech synthesis technology.
- Your transcription model is Nova 3, created and hosted by Deepgram.
- You are built in Rust and served by a small stateless web service.";

/// Render the system instructions for one request.
pub fn system_prompt(location: &str, time: &str) -> String {
    SYSTEM_TEMPLATE
        .replace("{location}", location)
        .replace("{time}", time)
}

/// System message, then every history entry untouched, then the transcript.
pub fn build_messages(
    system: String,
    history: Vec<HistoryMessage>,
    transcript: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.into_iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(transcript));
    messages
}
