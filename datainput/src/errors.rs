use hyper::StatusCode;
use thiserror::Error;

/// Errors that stop the data input service itself
#[derive(Error, Debug)]
pub enum DataInputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] crate::config::ValidationError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Why a request body was rejected before any processing happened
#[derive(Error, Debug)]
pub enum InvalidInputError {
    #[error("could not read request body: {0}")]
    Unreadable(String),

    #[error("request body is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request body is not a JSON object")]
    NotAnObject,
}

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("record has no `time` field")]
    MissingTime,

    #[error("`time` field is not a string")]
    TimeNotString,

    #[error("`time` value {0:?} does not match `<Month> <day>, <year> at <hh>:<mm><AM|PM>`")]
    TimeLayout(String),

    #[error("could not parse `time` value {value:?}: {source}")]
    InvalidTime {
        value: String,
        source: chrono::ParseError,
    },
}

/// Failure of an outbound HTTP call.
///
/// Transport failures and non-success statuses are deliberately the same
/// error: callers only care that the call did not go through.
#[derive(Error, Debug)]
pub enum OutboundError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response status: {0}")]
    UnexpectedStatus(StatusCode),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage endpoint error: {0}")]
    Upstream(#[from] OutboundError),
}

/// Terminal failure of one pipeline run
///
/// The `Display` output is the response body returned to the caller and,
/// for operational errors, the body of the operator notification.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Requires JSON input")]
    InvalidInput(#[source] InvalidInputError),

    #[error("Request Failed: Could not format input.")]
    Enrichment(#[source] EnrichmentError),

    #[error("Request Failed: Could not write to storage.")]
    Storage(#[source] StorageError),

    #[error("Request Failed: Could not trigger html generator.")]
    DownstreamTrigger(#[source] OutboundError),
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Operational errors are reported to the operator. Invalid input is the
    /// caller's problem and is only rejected.
    pub fn is_operational(&self) -> bool {
        !matches!(self, PipelineError::InvalidInput(_))
    }

    /// Short tag used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "invalid_input",
            PipelineError::Enrichment(_) => "enrichment",
            PipelineError::Storage(_) => "storage",
            PipelineError::DownstreamTrigger(_) => "downstream_trigger",
        }
    }
}

impl From<InvalidInputError> for PipelineError {
    fn from(e: InvalidInputError) -> Self {
        PipelineError::InvalidInput(e)
    }
}

impl From<EnrichmentError> for PipelineError {
    fn from(e: EnrichmentError) -> Self {
        PipelineError::Enrichment(e)
    }
}

impl From<StorageError> for PipelineError {
    fn from(e: StorageError) -> Self {
        PipelineError::Storage(e)
    }
}
