use std::{fmt, path::PathBuf, sync::Arc};

use crate::error::BackendError;

pub const SUCCESS_MARKER: char = '✓';
pub const FAILURE_MARKER: char = '✗';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Failure,
    Info,
}

/// The single current status line shown to the user.
///
/// The variant carries the classification; `Display` adds the marker used on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Success(String),
    Failure(String),
    Info(String),
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        StatusMessage::Success(text.into())
    }

    pub fn failure(text: impl Into<String>) -> Self {
        StatusMessage::Failure(text.into())
    }

    pub fn info(text: impl Into<String>) -> Self {
        StatusMessage::Info(text.into())
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            StatusMessage::Success(_) => StatusKind::Success,
            StatusMessage::Failure(_) => StatusKind::Failure,
            StatusMessage::Info(_) => StatusKind::Info,
        }
    }

    /// Message text without any marker.
    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Success(text)
            | StatusMessage::Failure(text)
            | StatusMessage::Info(text) => text,
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Success(text) => write!(f, "{SUCCESS_MARKER} {text}"),
            StatusMessage::Failure(text) => write!(f, "{FAILURE_MARKER} Error: {text}"),
            StatusMessage::Info(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    InMemory(Arc<[u8]>),
    /// Read lazily when the upload is issued.
    OnDisk(PathBuf),
}

/// A locally chosen document awaiting ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    content: FileContent,
}

impl SelectedFile {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: FileContent::InMemory(Arc::from(bytes.into())),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            content: FileContent::OnDisk(path),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    pub async fn read(&self) -> Result<Vec<u8>, BackendError> {
        match &self.content {
            FileContent::InMemory(bytes) => Ok(bytes.to_vec()),
            FileContent::OnDisk(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|err| BackendError::LocalFile {
                        name: self.name.clone(),
                        reason: err.to_string(),
                    })
            }
        }
    }
}
