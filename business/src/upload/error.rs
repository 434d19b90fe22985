use std::path::PathBuf;

use thiserror::Error;

/// Why a transfer ended in `Failed`.
///
/// The `Display` text is what the status line shows; `detail` carries the
/// underlying cause for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No file selected. Please choose a file first.")]
    NoFileSelected,
    #[error("❌ Upload failed: {status_text}")]
    ServerRejection { status: u16, status_text: String },
    #[error("❌ Network error during upload.")]
    Network { detail: String },
    #[error("❌ Unexpected error occurred.")]
    Unexpected { detail: String },
}

impl UploadError {
    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            detail: detail.into(),
        }
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self::Unexpected {
            detail: detail.into(),
        }
    }

    /// Diagnostic text, when the variant carries any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Network { detail } | Self::Unexpected { detail } => Some(detail),
            Self::NoFileSelected | Self::ServerRejection { .. } => None,
        }
    }
}

/// Failure to turn a path on disk into a `SelectedFile`.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Invalid filename: {}", path.display())]
    InvalidName { path: PathBuf },
    #[error("Failed to read file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
