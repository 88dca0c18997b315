//! Error types for the merge-numbered library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the merge-numbered library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Folder does not exist
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// Path exists but is not a folder
    #[error("Not a folder: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Folder contains no PDF files
    #[error("No PDF files found in folder: {}", .0.display())]
    NoPdfFiles(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Whether this error means "nothing to merge" rather than a processing failure
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::FolderNotFound(_) | Error::NotADirectory(_) | Error::NoPdfFiles(_)
        )
    }
}
