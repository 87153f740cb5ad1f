use thiserror::Error;

/// Errors returned by the mapping platform collaborators.
#[derive(Debug, Error)]
pub enum MapsError {
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("unreadable response: {0}")]
    Json(#[source] reqwest::Error),
    #[error("service returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status {
        status: String,
        message: Option<String>,
    },
    #[error("no place matched {0:?}")]
    NoPlace(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for MapsError {
    fn from(err: reqwest::Error) -> Self {
        MapsError::Http(err)
    }
}
