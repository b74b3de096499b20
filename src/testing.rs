//! In-memory backend for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::Bytes;
use futures::channel::mpsc;
use futures::StreamExt;
use parking_lot::Mutex;

use crate::{
    backend::{Backend, ChunkStream, UploadFile},
    error::{ClientError, Result},
    types::GenerationRequest,
};

enum Script {
    Stream(mpsc::UnboundedReceiver<Result<Bytes>>),
    Fail(ClientError),
}

/// Feeds chunks into a scripted generation stream
pub(crate) struct StreamFeeder {
    tx: mpsc::UnboundedSender<Result<Bytes>>,
}

impl StreamFeeder {
    pub(crate) fn send(&self, chunk: impl AsRef<[u8]>) {
        let _ = self.tx.unbounded_send(Ok(Bytes::copy_from_slice(chunk.as_ref())));
    }

    pub(crate) fn fail(&self, error: ClientError) {
        let _ = self.tx.unbounded_send(Err(error));
    }

    /// Close the stream, as the server closing the connection
    pub(crate) fn close(self) {
        self.tx.close_channel();
    }
}

/// Backend whose generation responses are scripted by the test
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerationRequest>>,
    stop_calls: AtomicUsize,
    fail_stop: AtomicBool,
    fail_auxiliary: AtomicBool,
    system_prompts: Mutex<Vec<String>>,
    uploads: Mutex<Vec<Vec<UploadFile>>>,
    rag_toggles: Mutex<Vec<bool>>,
    cleanups: AtomicUsize,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a response stream for the next generate call
    pub(crate) fn push_stream(&self) -> StreamFeeder {
        let (tx, rx) = mpsc::unbounded();
        self.scripts.lock().push_back(Script::Stream(rx));
        StreamFeeder { tx }
    }

    /// Queue a failure for the next generate call
    pub(crate) fn push_failure(&self, error: ClientError) {
        self.scripts.lock().push_back(Script::Fail(error));
    }

    pub(crate) fn fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_auxiliary(&self, fail: bool) {
        self.fail_auxiliary.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn system_prompts(&self) -> Vec<String> {
        self.system_prompts.lock().clone()
    }

    pub(crate) fn uploads(&self) -> Vec<Vec<UploadFile>> {
        self.uploads.lock().clone()
    }

    pub(crate) fn rag_toggles(&self) -> Vec<bool> {
        self.rag_toggles.lock().clone()
    }

    pub(crate) fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }

    fn auxiliary(&self, endpoint: &str) -> Result<()> {
        if self.fail_auxiliary.load(Ordering::SeqCst) {
            return Err(ClientError::Transport {
                endpoint: endpoint.to_string(),
                status: Some(500),
                message: "HTTP status 500".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<ChunkStream> {
        self.requests.lock().push(request.clone());
        let script = self.scripts.lock().pop_front();
        match script {
            Some(Script::Stream(rx)) => Ok(rx.boxed()),
            Some(Script::Fail(error)) => Err(error),
            None => Ok(futures::stream::empty().boxed()),
        }
    }

    async fn stop_generation(&self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(ClientError::Transport {
                endpoint: "/stop-generation".to_string(),
                status: Some(500),
                message: "HTTP status 500".to_string(),
            });
        }
        Ok(())
    }

    async fn set_system_prompt(&self, prompt: &str) -> Result<()> {
        self.auxiliary("/set-system-prompt/")?;
        self.system_prompts.lock().push(prompt.to_string());
        Ok(())
    }

    async fn upload_documents(&self, files: Vec<UploadFile>) -> Result<()> {
        self.auxiliary("/upload-documents/")?;
        self.uploads.lock().push(files);
        Ok(())
    }

    async fn cleanup_database(&self) -> Result<()> {
        self.auxiliary("/cleanup-database/")?;
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn toggle_rag(&self, enabled: bool) -> Result<()> {
        self.auxiliary("/toggle-rag/")?;
        self.rag_toggles.lock().push(enabled);
        Ok(())
    }
}
