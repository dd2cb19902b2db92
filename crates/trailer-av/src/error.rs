//! Error types for trailer-av.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while probing a media file, locating a tool, or staging a download.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{tool} is not installed or not on PATH")]
    ToolNotFound { tool: String },

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// The tool ran but printed something we could not use.
    #[error("unexpected {tool} output: {message}")]
    BadOutput { tool: String, message: String },

    #[error("no such media file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A path handed to the workspace does not belong to it.
    #[error("{} is not inside the download workspace", .0.display())]
    OutsideWorkspace(PathBuf),

    #[error("download staging failed: {0}")]
    Staging(String),
}

impl Error {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn bad_output(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadOutput {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
