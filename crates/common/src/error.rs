//! Error types for the Research Bank

use thiserror::Error;

/// Result type alias using the Research Bank error
pub type Result<T> = std::result::Result<T, Error>;

/// Research Bank error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalogue parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetching {location} returned status {status}")]
    Fetch { location: String, status: u16 },

    #[error("Duplicate catalogue id: {0}")]
    DuplicateId(String),

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn item_not_found(id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: "catalogue item".to_string(),
            id: id.into(),
        }
    }

    /// Whether the error came from retrieving the catalogue document
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Fetch { .. } | Error::Io(_))
    }
}
