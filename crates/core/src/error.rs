use fhir::{FhirError, ResourceType};

/// Failures talking to the FHIR server, in the three categories the
/// fallback policy cares about: connectivity, HTTP status, and response shape.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to reach FHIR server: {0}")]
    Transport(String),
    #[error("request to FHIR server timed out")]
    Timeout,
    #[error("FHIR server rejected credentials (401)")]
    Unauthorized,
    #[error("FHIR server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed FHIR response: {0}")]
    Decode(String),
    #[error("unexpected FHIR content: {0}")]
    Fhir(#[from] FhirError),
}

impl ClientError {
    /// Whether retrying the same request may succeed.
    ///
    /// Connectivity failures, timeouts, throttling and server errors are
    /// transient; client errors and malformed content are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Timeout => true,
            ClientError::Status { status, .. } => *status == 429 || *status >= 500,
            ClientError::Unauthorized | ClientError::Decode(_) | ClientError::Fhir(_) => false,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{resource}/{id} not found")]
    NotFound { resource: ResourceType, id: String },
    #[error("FHIR server unavailable: {0}")]
    Upstream(#[from] ClientError),
    #[error("FHIR translation failed: {0}")]
    Fhir(#[from] FhirError),
}

impl From<telecare_types::TextError> for CoreError {
    fn from(err: telecare_types::TextError) -> Self {
        CoreError::InvalidInput(err.to_string())
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
