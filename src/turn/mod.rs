//! One voice turn, from multipart form to streamed speech.

pub mod caller;
pub mod form;
pub mod handler;
pub mod prompt;
pub mod timing;

pub use caller::CallerContext;
pub use form::{FormError, FormField, HistoryMessage, HistoryRole, IncomingTurn, TurnInput};
pub use handler::{handle_turn, resolve_transcript, run_turn};
pub use timing::PhaseTimer;
