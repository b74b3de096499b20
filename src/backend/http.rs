// Location: src/backend/http.rs

use futures::StreamExt;
use reqwest::{multipart, Client, Response, StatusCode};
use serde_json::json;
use tracing::{debug, warn};

use super::{Backend, ChunkStream, UploadFile};
use crate::{
    config::ClientConfig,
    error::{ClientError, Result},
    types::GenerationRequest,
};

/// [`Backend`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .connect_timeout(config.server.connect_timeout)
            .build()
            .map_err(|e| ClientError::transport(config.server.base_url.clone(), e))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn post(&self, path: &str, build: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder) -> Result<Response> {
        let url = self.config.url(path);
        debug!(%url, "POST");
        let response = build(self.client.post(&url))
            .send()
            .await
            .map_err(|e| ClientError::transport(path, e))?;
        check_status(path, response)
    }
}

fn check_status(endpoint: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ClientError::Transport {
        endpoint: endpoint.to_string(),
        status: Some(status.as_u16()),
        message: format!("HTTP status {}", status),
    })
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<ChunkStream> {
        let endpoint = self.config.endpoints.generate.clone();
        let response = match self.post(&endpoint, |b| b.json(request)).await {
            Ok(response) => response,
            Err(ClientError::Transport { status: Some(code), .. })
                if code == StatusCode::CONFLICT.as_u16() =>
            {
                debug!("generation request answered with a cancellation");
                return Err(ClientError::Cancelled);
            }
            Err(e) => return Err(e),
        };

        let stream = response
            .bytes_stream()
            .map(move |item| item.map_err(|e| ClientError::transport(endpoint.as_str(), e)));
        Ok(stream.boxed())
    }

    async fn stop_generation(&self) -> Result<()> {
        self.post(&self.config.endpoints.stop_generation, |b| b).await?;
        Ok(())
    }

    async fn set_system_prompt(&self, prompt: &str) -> Result<()> {
        let body = json!({ "system_prompt": prompt });
        self.post(&self.config.endpoints.set_system_prompt, |b| b.json(&body)).await?;
        Ok(())
    }

    async fn upload_documents(&self, files: Vec<UploadFile>) -> Result<()> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.content).file_name(file.file_name);
            form = form.part("files", part);
        }
        self.post(&self.config.endpoints.upload_documents, |b| b.multipart(form)).await?;
        Ok(())
    }

    async fn cleanup_database(&self) -> Result<()> {
        self.post(&self.config.endpoints.cleanup_database, |b| b).await?;
        Ok(())
    }

    async fn toggle_rag(&self, enabled: bool) -> Result<()> {
        let body = json!({ "enableRAG": enabled });
        if let Err(e) = self.post(&self.config.endpoints.toggle_rag, |b| b.json(&body)).await {
            warn!(enabled, "toggle-rag rejected: {}", e);
            return Err(e);
        }
        Ok(())
    }
}
