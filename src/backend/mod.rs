//! Backend seam: the generation endpoint and the auxiliary endpoints

mod decoder;
mod http;

pub use decoder::Utf8Decoder;
pub use http::HttpBackend;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::{error::Result, types::GenerationRequest};

/// Streamed body of a generation response, in arrival order
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// A document selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Operations offered by the chat backend.
///
/// Every call reports success through its `Result` only; payloads other
/// than the generation stream are ignored.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Start a generation. Resolves once response headers arrive.
    async fn generate(&self, request: &GenerationRequest) -> Result<ChunkStream>;

    /// Ask the backend to stop the running generation
    async fn stop_generation(&self) -> Result<()>;

    /// Replace the system prompt, an empty string clears it
    async fn set_system_prompt(&self, prompt: &str) -> Result<()>;

    async fn upload_documents(&self, files: Vec<UploadFile>) -> Result<()>;

    async fn cleanup_database(&self) -> Result<()>;

    async fn toggle_rag(&self, enabled: bool) -> Result<()>;
}
