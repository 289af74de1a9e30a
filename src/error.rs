// File: error.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

//! Error type shared by the library and the command line driver.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Required option not specified: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid value for {option}: {message}")]
    InvalidArgument {
        option: &'static str,
        message: String,
    },

    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid checkpoint '{path}': {reason}", path = path.display())]
    Checkpoint { path: PathBuf, reason: String },

    #[error("Failed to read structure '{path}': {reason}", path = path.display())]
    Structure { path: PathBuf, reason: String },

    #[error("All windows were filtered out in round {round}; nothing to compare")]
    NoQueryWindows { round: String },

    #[error("Alignment failed: {0}")]
    Alignment(String),

    #[error("Search cancelled")]
    Cancelled,
}

impl SearchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SearchError::Io { path: path.into(), source }
    }

    pub fn checkpoint(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SearchError::Checkpoint { path: path.into(), reason: reason.into() }
    }

    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            SearchError::MissingArgument(_) | SearchError::InvalidArgument { .. } => 2,
            SearchError::Io { .. } | SearchError::Checkpoint { .. } | SearchError::Structure { .. } => 3,
            SearchError::NoQueryWindows { .. } => 4,
            SearchError::Alignment(_) => 5,
            SearchError::Cancelled => 130,
        }
    }
}
