use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::error::{FileError, UploadError};

/// Status line shown once the server accepted the book.
pub const SUCCESS_MESSAGE: &str = "✅ Upload successful! Processing book...";

/// Status line shown while a transfer is in flight.
pub const UPLOADING_MESSAGE: &str = "Uploading...";

/// A file chosen by the user.
///
/// The payload is an immutable shared buffer, so clones handed to a transfer
/// are read-only views of the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime_type: String,
    data: Bytes,
}

impl SelectedFile {
    /// The MIME type is guessed from the file name.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        Self {
            name,
            mime_type,
            data: data.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Read a file from disk, keeping its base name.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FileError::InvalidName {
                path: path.to_path_buf(),
            })?;

        let data = tokio::fs::read(path)
            .await
            .map_err(|source| FileError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!("Read {} ({} bytes) from {}", name, data.len(), path.display());
        Ok(Self::new(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Form fields sent alongside the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMetadata {
    pub user_id: String,
    pub language: String,
}

impl TransferMetadata {
    pub fn new(user_id: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            language: language.into(),
        }
    }

    /// Field name and value pairs, in the order they go on the wire.
    pub fn fields(&self) -> [(&'static str, &str); 2] {
        [("user_id", &self.user_id), ("language", &self.language)]
    }
}

impl Default for TransferMetadata {
    fn default() -> Self {
        Self::new("1", "es")
    }
}

/// Acknowledgement body returned by the ingestion API on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub status: String,
    pub id: String,
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransferState {
    #[default]
    Idle,
    Ready,
    InFlight(u8),
    Succeeded(Option<UploadReceipt>),
    Failed(UploadError),
}

impl TransferState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// Value for the progress indicator.
    pub fn progress_percent(&self) -> u8 {
        match self {
            Self::InFlight(percent) => *percent,
            Self::Succeeded(_) => 100,
            Self::Idle | Self::Ready | Self::Failed(_) => 0,
        }
    }

    /// Human-readable status line; empty when there is nothing to report.
    pub fn message(&self) -> String {
        match self {
            Self::Idle | Self::Ready => String::new(),
            Self::InFlight(_) => UPLOADING_MESSAGE.to_owned(),
            Self::Succeeded(_) => SUCCESS_MESSAGE.to_owned(),
            Self::Failed(err) => err.to_string(),
        }
    }

    pub fn receipt(&self) -> Option<&UploadReceipt> {
        match self {
            Self::Succeeded(receipt) => receipt.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&UploadError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// What `start_upload` did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A request was dispatched.
    Started,
    /// A transfer is already in flight; nothing was sent.
    AlreadyInProgress,
    /// Preconditions failed; the state is now `Failed`.
    Rejected,
}
