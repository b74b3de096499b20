//! RAG Chat Client - streaming generation sessions against a chat backend
//!
//! This crate drives a retrieval-augmented chat server: it validates
//! generation parameters, streams the reply into a formatted transcript,
//! supports best-effort cancellation, and wraps the server's auxiliary
//! actions (system prompt, document upload, database cleanup, RAG mode).

// Public modules
pub mod actions;
pub mod backend;
pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod notify;
pub mod session;
pub mod transcript;
pub mod types;
pub mod ui;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod testing;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports for public API
pub use backend::{Backend, HttpBackend};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use format::format;
pub use metrics::MetricsCollector;
pub use notify::{LogNotifier, MemoryNotifier, Notifier};
pub use session::{ControllerBuilder, GenerationController, SubmitOutcome};
pub use transcript::{Transcript, TranscriptEvent};
pub use types::{Affordance, GenerationRequest, Sender, SessionStatus};
pub use validation::{validate, ParameterForm};
