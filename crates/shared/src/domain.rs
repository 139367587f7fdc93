use std::fmt;

/// Backend operations reachable from the client, with their fixed routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    Ingest,
    GenerateVideo,
    Ask,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Health => "/",
            Endpoint::Ingest => "/test-ingest",
            Endpoint::GenerateVideo => "/generate-video",
            Endpoint::Ask => "/test-ask",
        }
    }

    pub fn method(self) -> &'static str {
        match self {
            Endpoint::Health => "GET",
            Endpoint::Ingest | Endpoint::GenerateVideo | Endpoint::Ask => "POST",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// Multipart field name the ingestion endpoint reads the document from.
pub const INGEST_FILE_FIELD: &str = "file";

/// Title sent with every generation request unless configured otherwise.
pub const DEFAULT_VIDEO_TITLE: &str = "Auto-Didact Video";
