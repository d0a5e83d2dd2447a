//! Error types for turnaround-dash

use thiserror::Error;

/// Result type alias for turnaround-dash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for turnaround-dash
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load document: {name}")]
    MissingDocumentError {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid document {name}")]
    InvalidDocumentError {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Attach the name of the document being loaded
    pub fn in_document(self, name: &str) -> Self {
        match self {
            Error::InvalidDocumentError { .. } | Error::MissingDocumentError { .. } => self,
            other => Error::MissingDocumentError {
                name: name.to_string(),
                source: Box::new(other),
            },
        }
    }
}
