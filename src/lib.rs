//! Swift - stateless voice assistant service
//!
//! One HTTP endpoint takes a spoken or typed utterance plus the
//! conversation so far, and streams back a spoken reply.
//!
//! ## Pipeline
//!
//! - **Transcription:** Deepgram Nova 3 turns uploaded audio into text
//! - **Completion:** a Groq-hosted chat model writes a short reply
//! - **Synthesis:** Cartesia Sonic speaks it as raw 32-bit float PCM
//!
//! The transcript and reply travel back as percent-encoded `X-Transcript`
//! and `X-Response` headers next to the streamed audio body.
//!
//! ## Quick Start
//!
//! ```bash
//! export DEEPGRAM_API_KEY=... GROQ_API_KEY=... CARTESIA_API_KEY=...
//! swift-voice serve --port 3000
//!
//! curl -F input="What's the weather?" http://localhost:3000/api -o reply.pcm -D -
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod providers;
pub mod server;
pub mod turn;
pub mod utils;

// Re-export commonly used types
pub use error::TurnError;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
