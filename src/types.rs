//! Common type definitions used throughout the client

use std::fmt;
use serde::{Deserialize, Serialize};

/// Validated sampling parameters for one generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Context window size
    pub num_ctx: u32,
    /// Sampling temperature
    pub temperature: f64,
    /// How far back the model looks to prevent repetition
    pub repeat_last_n: u32,
    /// Penalty applied to repetitions
    pub repeat_penalty: f64,
    /// Number of retrieved documents, only set in RAG mode
    pub top_n: Option<u32>,
}

/// Body of a generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    pub num_ctx: u32,
    pub temperature: f64,
    pub repeat_last_n: u32,
    pub repeat_penalty: f64,
}

impl GenerationRequest {
    /// Build a request from a trimmed prompt and validated parameters
    pub fn new(prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            prompt: prompt.into(),
            top_n: params.top_n,
            num_ctx: params.num_ctx,
            temperature: params.temperature,
            repeat_last_n: params.repeat_last_n,
            repeat_penalty: params.repeat_penalty,
        }
    }
}

/// Author of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

/// Opaque reference to one block in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageHandle(pub(crate) usize);

/// One rendered block of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMessage {
    pub sender: Sender,
    /// Sanitized markup, never raw text
    pub display_html: String,
}

/// Lifecycle state of the generation session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Idle,
    Awaiting,
    Streaming,
    Cancelling,
}

impl SessionStatus {
    /// Whether a generation is outstanding
    pub fn is_active(self) -> bool {
        self != SessionStatus::Idle
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Awaiting => "awaiting",
            SessionStatus::Streaming => "streaming",
            SessionStatus::Cancelling => "cancelling",
        };
        f.write_str(name)
    }
}

/// State of the submit/stop control next to the prompt input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Affordance {
    /// Default arrow icon, submits the prompt
    #[default]
    Submit,
    /// Stop icon while a generation is running
    Stop,
    /// Stop icon deactivated after a cancel request
    StopInactive,
}

impl Affordance {
    /// Icon asset shown for this state
    pub fn icon(self) -> &'static str {
        match self {
            Affordance::Submit => "up_arrow.svg",
            Affordance::Stop | Affordance::StopInactive => "stop.svg",
        }
    }
}
