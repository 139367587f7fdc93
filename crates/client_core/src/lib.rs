use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Endpoint, INGEST_FILE_FIELD},
    error::ErrorBody,
    protocol::{
        AskRequest, AskResponse, GenerateVideoRequest, GenerateVideoResponse, HealthResponse,
        IngestResponse,
    },
};
use tracing::debug;
use url::Url;

pub mod error;
pub mod session;
pub mod settings;
pub mod types;

pub use error::{BackendError, GuardError, Rejected};
pub use session::{OperationKind, OperationTicket, SessionController};
pub use settings::{load_settings, Settings, StatusOrdering};
pub use types::{FileContent, SelectedFile, StatusKind, StatusMessage};

/// Remote operations the session controller depends on.
#[async_trait]
pub trait StudioBackend: Send + Sync {
    async fn health(&self) -> Result<HealthResponse, BackendError>;
    async fn ingest(&self, document: &SelectedFile) -> Result<IngestResponse, BackendError>;
    async fn generate_video(
        &self,
        request: &GenerateVideoRequest,
    ) -> Result<GenerateVideoResponse, BackendError>;
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError>;
}

/// `StudioBackend` over HTTP.
#[derive(Debug)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut builder = Client::builder().connect_timeout(settings.connect_timeout());
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;
        Ok(Self::with_client(http, &settings.backend_url)?)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url.trim())
            .map_err(|e| BackendError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, BackendError> {
        // Relative join keeps any path prefix on the configured base url.
        self.base_url
            .join(endpoint.path().trim_start_matches('/'))
            .map_err(|e| BackendError::InvalidUrl(format!("{endpoint}: {e}")))
    }
}

async fn read_json<T: DeserializeOwned>(
    endpoint: Endpoint,
    response: Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    debug!(%endpoint, status = status.as_u16(), len = bytes.len(), "backend response");

    if !status.is_success() {
        let detail = ErrorBody::from_slice(&bytes).and_then(|body| body.detail_text());
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(format!("{endpoint}: {e}")))
}

#[async_trait]
impl StudioBackend for HttpBackend {
    async fn health(&self) -> Result<HealthResponse, BackendError> {
        let url = self.endpoint_url(Endpoint::Health)?;
        let response = self.http.get(url).send().await?;
        read_json(Endpoint::Health, response).await
    }

    async fn ingest(&self, document: &SelectedFile) -> Result<IngestResponse, BackendError> {
        let url = self.endpoint_url(Endpoint::Ingest)?;
        let content = document.read().await?;
        let mime = mime_guess::from_path(document.name()).first_or_octet_stream();
        let part = Part::bytes(content)
            .file_name(document.name().to_string())
            .mime_str(mime.essence_str())
            .map_err(|e| BackendError::LocalFile {
                name: document.name().to_string(),
                reason: e.to_string(),
            })?;
        let form = Form::new().part(INGEST_FILE_FIELD, part);

        let response = self.http.post(url).multipart(form).send().await?;
        read_json(Endpoint::Ingest, response).await
    }

    async fn generate_video(
        &self,
        request: &GenerateVideoRequest,
    ) -> Result<GenerateVideoResponse, BackendError> {
        let url = self.endpoint_url(Endpoint::GenerateVideo)?;
        let response = self.http.post(url).json(request).send().await?;
        read_json(Endpoint::GenerateVideo, response).await
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        let url = self.endpoint_url(Endpoint::Ask)?;
        let response = self.http.post(url).json(request).send().await?;
        read_json(Endpoint::Ask, response).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
