// Location: src/session/controller.rs

use std::sync::Arc;
use std::time::Instant;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::state::GenerationSession;
use crate::{
    actions::AuxiliaryActions,
    backend::{Backend, ChunkStream, Utf8Decoder},
    error::{ClientError, ErrorExt, Result},
    metrics::{MetricsCollector, MetricsSnapshot, SessionOutcome},
    notify::Notifier,
    transcript::{Transcript, TranscriptEvent},
    types::{Affordance, GenerationRequest, Sender, SessionStatus, TranscriptMessage},
    validation::{validate, ParameterForm},
};

const SETTINGS_ERROR: &str = "An error occurred regarding the settings.";
const EMPTY_PROMPT_ERROR: &str = "Please enter a prompt.";
const REQUEST_ERROR: &str = "Error during the request. Make sure the server is running.";

/// Result of a [`GenerationController::submit`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A generation was already running, nothing was sent
    Busy,
    /// Parameter validation failed, nothing was sent
    InvalidParameters(Vec<String>),
    /// The prompt was empty after trimming, nothing was sent
    EmptyPrompt,
    /// The stream ran to completion
    Completed,
    /// The user cancelled and the backend stopped
    Cancelled,
    /// Transport failure; partial output stays in the transcript
    Failed(String),
}

struct ControllerState {
    session: GenerationSession,
    form: ParameterForm,
    rag_enabled: bool,
    prompt_draft: String,
    affordance: Affordance,
}

struct Inner {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    actions: AuxiliaryActions,
    metrics: MetricsCollector,
    // Lock order: state before transcript
    state: Mutex<ControllerState>,
    transcript: Mutex<Transcript>,
}

enum Prepared {
    Busy,
    Invalid(Vec<String>),
    EmptyPrompt,
    Ready(GenerationRequest),
}

/// Drives generation sessions: validation, request, streaming render and
/// cancellation. Clones share the same session.
#[derive(Clone)]
pub struct GenerationController {
    inner: Arc<Inner>,
}

impl GenerationController {
    pub(crate) fn new(
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        actions: AuxiliaryActions,
        metrics: MetricsCollector,
        form: ParameterForm,
        rag_enabled: bool,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                notifier,
                actions,
                metrics,
                state: Mutex::new(ControllerState {
                    session: GenerationSession::default(),
                    form,
                    rag_enabled,
                    prompt_draft: String::new(),
                    affordance: Affordance::Submit,
                }),
                transcript: Mutex::new(Transcript::new()),
            }),
        }
    }

    /// Submit a prompt and stream the reply into the transcript.
    ///
    /// Resolves when the session is back to `Idle`. Failures are reported
    /// through the notifier and the returned outcome, never as an error.
    pub async fn submit(&self, prompt_text: &str) -> SubmitOutcome {
        let prepared = self.prepare(prompt_text);
        let inner = &self.inner;

        match prepared {
            Prepared::Busy => {
                debug!("submit ignored, a generation is already running");
                inner.metrics.record_rejected_busy().await;
                SubmitOutcome::Busy
            }
            Prepared::Invalid(errors) => {
                for message in &errors {
                    inner.notifier.error(message);
                }
                inner.notifier.error(SETTINGS_ERROR);
                inner.metrics.record_validation_failure().await;
                SubmitOutcome::InvalidParameters(errors)
            }
            Prepared::EmptyPrompt => {
                inner.notifier.error(EMPTY_PROMPT_ERROR);
                SubmitOutcome::EmptyPrompt
            }
            Prepared::Ready(request) => self.run(request).await,
        }
    }

    /// Submit whatever is currently in the prompt draft
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let draft = self.prompt_draft();
        self.submit(&draft).await
    }

    /// Ask the backend to stop the running generation.
    ///
    /// Returns false, without contacting the backend, unless a session is
    /// `Awaiting` or `Streaming`. Chunks already on their way keep being
    /// rendered until the stream closes.
    pub async fn cancel(&self) -> bool {
        {
            let mut state = self.inner.state.lock();
            if !state.session.request_cancel() {
                debug!(status = %state.session.status(), "cancel ignored");
                return false;
            }
            state.affordance = Affordance::StopInactive;
        }

        info!("requesting generation stop");
        if let Err(e) = self.inner.backend.stop_generation().await {
            warn!("stop request failed: {}", e);
        }
        true
    }

    /// Enable or disable retrieval augmentation. The local mode flips
    /// immediately; the backend call is reported like any other action.
    pub async fn toggle_rag(&self, enabled: bool) -> Result<()> {
        self.inner.state.lock().rag_enabled = enabled;
        self.inner.actions.toggle_rag(enabled).await
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.state.lock().session.status()
    }

    /// Whether a generation is outstanding
    pub fn is_active(&self) -> bool {
        self.status().is_active()
    }

    pub fn affordance(&self) -> Affordance {
        self.inner.state.lock().affordance
    }

    pub fn prompt_draft(&self) -> String {
        self.inner.state.lock().prompt_draft.clone()
    }

    pub fn set_prompt_draft(&self, text: impl Into<String>) {
        self.inner.state.lock().prompt_draft = text.into();
    }

    pub fn form(&self) -> ParameterForm {
        self.inner.state.lock().form.clone()
    }

    pub fn set_form(&self, form: ParameterForm) {
        self.inner.state.lock().form = form;
    }

    pub fn rag_enabled(&self) -> bool {
        self.inner.state.lock().rag_enabled
    }

    pub fn actions(&self) -> &AuxiliaryActions {
        &self.inner.actions
    }

    /// Copy of every rendered message, oldest first
    pub fn transcript(&self) -> Vec<TranscriptMessage> {
        self.inner.transcript.lock().messages().to_vec()
    }

    /// Read the transcript under its lock
    pub fn with_transcript<R>(&self, f: impl FnOnce(&Transcript) -> R) -> R {
        f(&self.inner.transcript.lock())
    }

    /// Receive transcript changes as they happen
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TranscriptEvent> {
        self.inner.transcript.lock().subscribe()
    }

    pub async fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot().await
    }

    fn prepare(&self, prompt_text: &str) -> Prepared {
        let mut state = self.inner.state.lock();
        if state.session.status().is_active() {
            return Prepared::Busy;
        }

        let params = match validate(&state.form, state.rag_enabled).into_result() {
            Ok(params) => params,
            Err(ClientError::Validation(errors)) => return Prepared::Invalid(errors),
            Err(other) => return Prepared::Invalid(vec![other.to_string()]),
        };

        let prompt = prompt_text.trim();
        if prompt.is_empty() {
            return Prepared::EmptyPrompt;
        }

        self.inner.transcript.lock().append_message(prompt, Sender::User);
        state.prompt_draft.clear();
        state.session.begin();
        state.affordance = Affordance::Stop;
        Prepared::Ready(GenerationRequest::new(prompt, params))
    }

    async fn run(&self, request: GenerationRequest) -> SubmitOutcome {
        let started = Instant::now();
        self.inner.metrics.record_session_started().await;
        info!(
            num_ctx = request.num_ctx,
            temperature = request.temperature,
            repeat_last_n = request.repeat_last_n,
            repeat_penalty = request.repeat_penalty,
            top_n = ?request.top_n,
            "starting generation"
        );

        let result = match self.inner.backend.generate(&request).await {
            Ok(stream) => self.consume(stream, started).await,
            Err(e) => Err(e),
        };
        self.finish(result, started).await
    }

    async fn consume(&self, mut stream: ChunkStream, started: Instant) -> Result<()> {
        let mut decoder = Utf8Decoder::new();
        let mut first = true;

        while let Some(item) = stream.next().await {
            let bytes = item?;
            if first {
                first = false;
                self.inner.metrics.record_first_chunk(started.elapsed()).await;
            }
            self.inner.metrics.record_chunk(bytes.len()).await;
            let text = decoder.decode(&bytes);
            self.apply_chunk(&text)?;
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            self.apply_chunk(&tail)?;
        }
        Ok(())
    }

    fn apply_chunk(&self, text: &str) -> Result<()> {
        let mut state = self.inner.state.lock();
        let mut transcript = self.inner.transcript.lock();

        state.session.append(text);
        let handle = match state.session.target() {
            Some(handle) => handle,
            None => {
                let handle = transcript.begin_streaming_message();
                state.session.set_target(handle);
                handle
            }
        };

        debug!(bytes = text.len(), total = state.session.accumulated_text().len(), "chunk received");
        if text.is_empty() {
            return Ok(());
        }
        transcript.update_streaming_message(handle, state.session.accumulated_text())
    }

    async fn finish(&self, result: Result<()>, started: Instant) -> SubmitOutcome {
        let ended_in = {
            let mut state = self.inner.state.lock();
            state.affordance = Affordance::Submit;
            state.session.finish()
        };
        let was_cancelling = ended_in == SessionStatus::Cancelling;

        let (outcome, metric) = match result {
            Ok(()) if was_cancelling => (SubmitOutcome::Cancelled, SessionOutcome::Cancelled),
            Ok(()) => (SubmitOutcome::Completed, SessionOutcome::Completed),
            Err(e) if was_cancelling || e.is_cancellation() => {
                debug!("generation stopped: {}", e);
                (SubmitOutcome::Cancelled, SessionOutcome::Cancelled)
            }
            Err(e) => {
                error!("generation failed: {}", e);
                self.inner.notifier.error(REQUEST_ERROR);
                (SubmitOutcome::Failed(e.to_string()), SessionOutcome::Failed)
            }
        };

        info!(outcome = ?metric, elapsed_ms = started.elapsed().as_millis() as u64, "generation finished");
        self.inner.metrics.record_session_finished(metric, started.elapsed()).await;
        outcome
    }
}
