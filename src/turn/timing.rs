//! Phase timing diagnostics
//!
//! Each external call, and the response stream, is wrapped in a
//! [`PhaseTimer`] that logs its elapsed time when it ends.

use crate::providers::AudioStream;
use futures::StreamExt;
use std::time::{Duration, Instant};

pub struct PhaseTimer {
    phase: &'static str,
    request_id: String,
    started: Instant,
}

impl PhaseTimer {
    pub fn start(phase: &'static str, request_id: &str) -> Self {
        tracing::debug!("{} {}: started", phase, request_id);
        Self {
            phase,
            request_id: request_id.to_string(),
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// End the phase now. Dropping the timer has the same effect.
    pub fn finish(self) {}
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        tracing::info!(
            "{} {}: {:.3}ms",
            self.phase,
            self.request_id,
            self.elapsed().as_secs_f64() * 1000.0
        );
    }
}

/// Pass `stream` through unchanged; `timer` ends when the stream is
/// exhausted or dropped (e.g. the client went away).
pub fn timed_stream(stream: AudioStream, timer: PhaseTimer) -> AudioStream {
    let mut timer = Some(timer);
    Box::pin(stream.map(move |chunk| {
        if chunk.is_err() {
            tracing::warn!("Audio stream interrupted: {:?}", chunk.as_ref().err());
            timer.take();
        }
        chunk
    }))
}
