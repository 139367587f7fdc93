use thiserror::Error;

/// Failure of a single remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend answered with a non-2xx status.
    #[error("backend rejected request with status {status}{}", detail_suffix(.detail))]
    Rejected { status: u16, detail: Option<String> },
    /// The request never produced a response: refused connection, DNS failure, timeout.
    #[error("backend transport failure: {0}")]
    Transport(String),
    /// A 2xx response whose body did not match the contract.
    #[error("malformed backend response: {0}")]
    Decode(String),
    /// The selected document could not be read before upload.
    #[error("could not read {name}: {reason}")]
    LocalFile { name: String, reason: String },
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

impl BackendError {
    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Transport(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Transport(format!("request timed out: {err}"))
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

/// Client-side precondition failures. These never reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("no document selected")]
    NoFileSelected,
    #[error("context text is empty")]
    EmptyContext,
    #[error("question is empty")]
    EmptyQuestion,
}

/// Why a primary operation did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error("another operation is still in flight")]
    Busy,
}
