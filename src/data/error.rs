use std::path::PathBuf;

use thiserror::Error;

/// Why the orders file could not be turned into a [`Dataset`](super::model::Dataset).
///
/// Loading is all-or-nothing: either every row parses or the whole file is rejected.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The path does not point at a readable file.
    #[error("Data file not found! Please ensure '{}' exists.", path.display())]
    FileNotFound { path: PathBuf },

    /// Malformed row, missing column, type mismatch, bad encoding or any other reader failure.
    #[error("An error occurred while loading the data: {message}")]
    Parse { message: String },
}

impl LoadError {
    /// Short heading for the failure kind, shown above the message.
    pub fn title(&self) -> &'static str {
        match self {
            LoadError::FileNotFound { .. } => "File not found",
            LoadError::Parse { .. } => "Could not read data",
        }
    }
}
