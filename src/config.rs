// Location: src/config.rs

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::validation::{validate, ParameterForm};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerConfig,
    pub endpoints: EndpointConfig,
    pub generation: GenerationConfig,
    pub upload: UploadConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Scheme, host and port of the backend
    pub base_url: String,

    /// Connection establishment timeout
    pub connect_timeout: Duration,
}

/// Paths of the backend endpoints, relative to `base_url`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub generate: String,
    pub stop_generation: String,
    pub set_system_prompt: String,
    pub upload_documents: String,
    pub cleanup_database: String,
    pub toggle_rag: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Initial values of the parameter inputs
    pub form: ParameterForm,

    /// Whether retrieval augmentation starts enabled
    pub rag_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Accepted file extensions, compared case-insensitively
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Whether to collect session metrics
    pub enable_metrics: bool,

    /// Log level
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            generate: "/generate-response/".to_string(),
            stop_generation: "/stop-generation".to_string(),
            set_system_prompt: "/set-system-prompt/".to_string(),
            upload_documents: "/upload-documents/".to_string(),
            cleanup_database: "/cleanup-database/".to_string(),
            toggle_rag: "/toggle-rag/".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["docx", "pptx", "pdf", "txt", "xlsx", "csv", "html", "md", "rtf", "odt"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            log_level: LogLevel::Info,
        }
    }
}

impl EndpointConfig {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("generate", self.generate.as_str()),
            ("stop_generation", self.stop_generation.as_str()),
            ("set_system_prompt", self.set_system_prompt.as_str()),
            ("upload_documents", self.upload_documents.as_str()),
            ("cleanup_database", self.cleanup_database.as_str()),
            ("toggle_rag", self.toggle_rag.as_str()),
        ]
    }
}

impl ClientConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Absolute URL of an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.server.base_url.trim();
        if base_url.is_empty() {
            return Err(ClientError::configuration("base_url", "Base URL cannot be empty"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::configuration(
                "base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        for (name, path) in self.endpoints.entries() {
            if path.trim().is_empty() {
                return Err(ClientError::configuration(name, "Endpoint path cannot be empty"));
            }
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(ClientError::configuration(
                "allowed_extensions",
                "At least one upload extension must be allowed",
            ));
        }

        if let Err(e) = validate(&self.generation.form, self.generation.rag_enabled).into_result() {
            return Err(ClientError::configuration("generation.form", e.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.endpoints.generate, "/generate-response/");
        assert_eq!(config.upload.allowed_extensions.len(), 10);
        assert!(!config.generation.rag_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialized_sections() {
        let value = serde_json::to_value(ClientConfig::default()).unwrap();
        let mut sections: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        sections.sort();
        assert_eq!(sections, vec!["endpoints", "generation", "monitoring", "server", "upload"]);
    }

    #[test]
    fn test_url_joining() {
        let mut config = ClientConfig::default();
        config.server.base_url = "http://localhost:8000/".to_string();
        assert_eq!(config.url("/toggle-rag/"), "http://localhost:8000/toggle-rag/");
        assert_eq!(config.url("stop-generation"), "http://localhost:8000/stop-generation");
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();
        config.server.base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.endpoints.cleanup_database = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ClientError::Configuration { ref parameter, .. }) if parameter == "cleanup_database"
        ));

        let mut config = ClientConfig::default();
        config.upload.allowed_extensions.clear();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.generation.form.temperature = "3".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"server": {{"base_url": "https://chat.example.com"}}, "generation": {{"rag_enabled": true}}}}"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.base_url, "https://chat.example.com");
        assert!(config.generation.rag_enabled);
        assert_eq!(config.generation.form.num_ctx, "2048");
        assert_eq!(config.endpoints.stop_generation, "/stop-generation");
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(ClientConfig::from_file(file.path()), Err(ClientError::Json(_))));
    }
}
