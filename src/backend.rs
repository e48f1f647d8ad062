use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Multipart field name shared by every uploaded file.
pub const UPLOAD_FIELD: &str = "files";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to backend failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status} for {endpoint}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("background request did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: ReplyPayload,
}

/// Chat replies are usually text, but the backend may hand back any JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplyPayload {
    Text(String),
    Structured(serde_json::Value),
}

impl ReplyPayload {
    pub fn into_text(self) -> String {
        match self {
            ReplyPayload::Text(text) => text,
            ReplyPayload::Structured(value) => value.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct EmbeddedFilesResponse {
    #[serde(default)]
    files: Vec<String>,
}

/// Snapshot returned by `GET /home`. The info fields are free-form and may
/// be any JSON value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendHealth {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub embedding: Option<serde_json::Value>,
    #[serde(default)]
    pub vectorstore: Option<serde_json::Value>,
    #[serde(default)]
    pub llm: Option<serde_json::Value>,
}

impl BackendHealth {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Embedding, vector store and language-model lines. Strings are shown
    /// as-is, other values as compact JSON, missing or null as empty.
    pub fn info_lines(&self) -> [String; 3] {
        [&self.embedding, &self.vectorstore, &self.llm].map(|field| match field {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(value) => value.to_string(),
        })
    }
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> BackendResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Sends one chat message and returns the reply normalized to text.
    pub async fn chat(&self, message: &str) -> BackendResult<String> {
        let endpoint = "/chat";
        debug!(endpoint, chars = message.chars().count(), "sending chat message");

        let response = self
            .client
            .post(self.url(endpoint))
            .json(&ChatRequest { message })
            .send()
            .await?;
        let response = check_status(endpoint, response)?;

        let chat: ChatResponse = response.json().await?;
        Ok(chat.response.into_text())
    }

    pub async fn embedded_files(&self) -> BackendResult<Vec<String>> {
        let endpoint = "/embedded_files";
        debug!(endpoint, "fetching indexed file list");

        let response = self.client.get(self.url(endpoint)).send().await?;
        let response = check_status(endpoint, response)?;

        let listing: EmbeddedFilesResponse = response.json().await?;
        Ok(listing.files)
    }

    /// Asks the backend to index every newly uploaded document. The body is ignored.
    pub async fn embed_all(&self) -> BackendResult<()> {
        let endpoint = "/embed_all";
        debug!(endpoint, "requesting embedding of uploaded documents");

        let response = self.client.post(self.url(endpoint)).send().await?;
        check_status(endpoint, response)?;
        Ok(())
    }

    /// Uploads all `paths` in a single multipart request, one `files` part each.
    pub async fn upload(&self, paths: &[PathBuf]) -> BackendResult<()> {
        let endpoint = "/upload";
        debug!(endpoint, count = paths.len(), "uploading files");

        let mut form = Form::new();
        for path in paths {
            form = form.part(UPLOAD_FIELD, file_part(path).await?);
        }

        let response = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await?;
        check_status(endpoint, response)?;
        Ok(())
    }

    pub async fn health(&self) -> BackendResult<BackendHealth> {
        let endpoint = "/home";
        debug!(endpoint, "fetching backend health");

        let response = self.client.get(self.url(endpoint)).send().await?;
        let response = check_status(endpoint, response)?;

        Ok(response.json().await?)
    }
}

fn check_status(
    endpoint: &'static str,
    response: reqwest::Response,
) -> BackendResult<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::Status { endpoint, status });
    }
    Ok(response)
}

async fn file_part(path: &Path) -> BackendResult<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| BackendError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Part::bytes(bytes).file_name(file_name))
}

/// Drops every `<` and `>` from a reply before it is stored or rendered.
pub fn strip_angle_brackets(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '<' | '>')).collect()
}
