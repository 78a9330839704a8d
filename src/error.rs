use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Malformed response body from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoding provider responded with {0}")]
    Status(StatusCode),

    #[error("Malformed geocoding response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Geocoding gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: usize, last: String },

    #[error("No match inside the service area for {0:?}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum BusinessError {
    #[error("Invalid business: {0}")]
    Validation(String),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
