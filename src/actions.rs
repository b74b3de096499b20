//! Auxiliary backend actions: system prompt, documents, database, RAG mode

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    backend::{Backend, UploadFile},
    config::UploadConfig,
    error::{ClientError, Result},
    notify::Notifier,
};

/// One-shot calls to the backend, each reported through the notifier
#[derive(Clone)]
pub struct AuxiliaryActions {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    upload: UploadConfig,
}

impl AuxiliaryActions {
    pub fn new(backend: Arc<dyn Backend>, notifier: Arc<dyn Notifier>, upload: UploadConfig) -> Self {
        Self {
            backend,
            notifier,
            upload,
        }
    }

    /// Set the system prompt. An empty prompt clears it.
    pub async fn set_system_prompt(&self, text: &str) -> Result<()> {
        let prompt = text.trim();
        self.report(
            self.backend.set_system_prompt(prompt).await,
            "System prompt set successfully.",
            "Error sending system prompt. Please try again.",
        )
    }

    /// Upload documents after checking every extension locally
    pub async fn upload_documents(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Err(self.guard("Please select a file to upload.".to_string()));
        }

        for path in paths {
            if !self.is_allowed(path) {
                return Err(self.guard(format!(
                    "The file \"{}\" is not allowed. Only {} formats are accepted.",
                    display_name(path),
                    self.upload.allowed_extensions.join(", ").to_uppercase()
                )));
            }
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match tokio::fs::read(path).await {
                Ok(content) => files.push(UploadFile {
                    file_name: display_name(path),
                    content,
                }),
                Err(e) => {
                    error!(path = %path.display(), "failed to read document: {}", e);
                    self.notifier.error("Error uploading documents. Please try again.");
                    return Err(e.into());
                }
            }
        }

        info!(count = files.len(), "uploading documents");
        self.report(
            self.backend.upload_documents(files).await,
            "Documents uploaded successfully.",
            "Error uploading documents. Please try again.",
        )
    }

    pub async fn cleanup_database(&self) -> Result<()> {
        self.report(
            self.backend.cleanup_database().await,
            "Database cleaned successfully.",
            "Error cleaning the database. Please try again.",
        )
    }

    pub async fn toggle_rag(&self, enabled: bool) -> Result<()> {
        let success = if enabled { "RAG mode enabled." } else { "RAG mode disabled." };
        self.report(
            self.backend.toggle_rag(enabled).await,
            success,
            "Error toggling RAG mode. Please try again.",
        )
    }

    /// Extension is the text after the last `.` of the file name, so a file
    /// called `.pdf` counts as a PDF
    fn is_allowed(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, e)| {
                self.upload
                    .allowed_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(e))
            })
            .unwrap_or(false)
    }

    fn guard(&self, message: String) -> ClientError {
        self.notifier.error(&message);
        ClientError::InputGuard(message)
    }

    fn report(&self, result: Result<()>, success: &str, failure: &str) -> Result<()> {
        match result {
            Ok(()) => {
                info!("{}", success);
                self.notifier.success(success);
                Ok(())
            }
            Err(e) => {
                error!("{}: {}", failure, e);
                self.notifier.error(failure);
                Err(e)
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
