//! Error types for the field mapping workflows.
//!
//! Every failure in this crate is recoverable: callers render the
//! `user_message()` next to the action that triggered it.

use std::path::PathBuf;

use thiserror::Error;

/// Failure turning raw input text into a batch payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PayloadError {
    /// Input is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Parse(String),

    /// Valid JSON with the wrong top-level shape.
    #[error("Input must be an object or array of objects")]
    Shape,

    /// The documents contain no fields to map.
    #[error("No fields found in input")]
    NoFields,
}

/// Failure talking to the mapping backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServiceError {
    /// The backend answered 404 for an endpoint it does not provide.
    #[error("endpoint not implemented: {endpoint}")]
    NotImplemented {
        /// Path of the missing endpoint.
        endpoint: String,
    },

    /// The backend answered with a non-success status.
    #[error("request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `detail` or `message` text from the response body.
        detail: Option<String>,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Returns a single human-readable message, preferring backend detail text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Status {
                status,
                detail: None,
            } => format!("Request failed ({status}). Please try again."),
            Self::NotImplemented { .. } => {
                "The mappings endpoint is not implemented on this backend yet.".to_string()
            }
            Self::Network(_) => {
                "Could not reach the mapping service. Please check that it is running."
                    .to_string()
            }
            Self::Decode(_) => "The mapping service returned an unexpected response.".to_string(),
        }
    }

    /// Whether this is the "endpoint not implemented" signal.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}

/// Failure in the mappings table edit workflow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableError {
    // =========================================================================
    // VALIDATION ERRORS
    // =========================================================================
    /// Draft failed client-side validation; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// Save requested without an open edit.
    #[error("No edit in progress")]
    NoActiveEdit,

    /// The row is not part of the loaded page.
    #[error("Mapping {0} is not on the current page")]
    RowNotFound(String),

    /// A save for this row has not completed yet.
    #[error("A save is already in progress for mapping {0}")]
    SaveInProgress(String),

    // =========================================================================
    // BACKEND ERRORS
    // =========================================================================
    /// The backend rejected or never received the update.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl TableError {
    /// Returns a message suitable for a blocking alert.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Service(error) => format!("Failed to save mapping: {}", error.user_message()),
            other => other.to_string(),
        }
    }
}

/// Failure producing a local export file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// There is nothing to export.
    #[error("No results to export")]
    Empty,

    /// Serializing the JSON export failed.
    #[error("Failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing CSV records failed.
    #[error("Failed to write CSV: {0}")]
    Csv(String),

    /// Writing the export file failed.
    #[error("Failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}
