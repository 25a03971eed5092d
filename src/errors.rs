//! Error types for the bookmarkhub application.
//!
//! This module defines the error enum shared by the bookmark core, the
//! persistence layer and the command-line front end.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the bookmarkhub application.
#[derive(Error, Debug)]
pub enum BmError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A payload reached an operation that requires a URL without one.
    #[error("URL is required")]
    MissingUrl,

    /// Bookmark was not found when performing an operation.
    #[error("Bookmark not found: {id}")]
    BookmarkNotFound { id: String },

    /// No bookmark matches the canonical form of the given URL.
    #[error("No bookmark found for URL: {url}")]
    UrlNotFound { url: String },

    /// Invalid bookmark file or import file content.
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {}", .path.display())]
    DirectoryError { path: PathBuf },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
