//! Configuration Module
//!
//! Handles application configuration loading, validation, and management.

pub mod secrets;
mod types;

pub use secrets::SecretString;
pub use types::{
    swift_home, CompletionConfig, Config, LoggingConfig, ServerConfig, SynthesisConfig,
    TranscriptionConfig,
};
