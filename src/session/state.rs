// Location: src/session/state.rs

use tracing::debug;

use crate::types::{MessageHandle, SessionStatus};

/// State of the one generation the controller may run at a time
#[derive(Debug, Default)]
pub struct GenerationSession {
    status: SessionStatus,
    accumulated_text: String,
    target: Option<MessageHandle>,
}

impl GenerationSession {
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Raw text received so far in this session
    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    /// The bot block this session renders into, once the first chunk arrived
    pub fn target(&self) -> Option<MessageHandle> {
        self.target
    }

    /// `Idle -> Awaiting`. Returns false if a session is already running.
    pub(crate) fn begin(&mut self) -> bool {
        if self.status.is_active() {
            return false;
        }
        self.accumulated_text.clear();
        self.target = None;
        self.transition(SessionStatus::Awaiting);
        true
    }

    /// Bind the streaming block on first use
    pub(crate) fn set_target(&mut self, handle: MessageHandle) {
        self.target = Some(handle);
    }

    /// Append decoded text. The first chunk moves `Awaiting` to `Streaming`;
    /// a session being cancelled keeps accepting text.
    pub(crate) fn append(&mut self, text: &str) {
        if self.status == SessionStatus::Awaiting {
            self.transition(SessionStatus::Streaming);
        }
        self.accumulated_text.push_str(text);
    }

    /// `Awaiting | Streaming -> Cancelling`. Returns false from any other state.
    pub(crate) fn request_cancel(&mut self) -> bool {
        match self.status {
            SessionStatus::Awaiting | SessionStatus::Streaming => {
                self.transition(SessionStatus::Cancelling);
                true
            }
            _ => false,
        }
    }

    /// Return to `Idle`, reporting the state the session ended in
    pub(crate) fn finish(&mut self) -> SessionStatus {
        let ended_in = self.status;
        self.transition(SessionStatus::Idle);
        self.target = None;
        ended_in
    }

    fn transition(&mut self, next: SessionStatus) {
        debug!(from = %self.status, to = %next, "session transition");
        self.status = next;
    }
}
