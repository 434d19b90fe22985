//! Book upload client for the Palabra ingestion API.
//!
//! [`UploadController`] turns a selected file plus [`TransferMetadata`] into a
//! multipart `POST {base}/api/books/upload` and exposes the transfer as a
//! single observable [`TransferState`].

mod config;
pub mod http;
pub mod upload;

pub use config::{ConfigError, DEFAULT_API_BASE_URL, UploadConfig};
pub use http::{ReqwestTransport, Transport};
pub use upload::{
    FileError, SelectedFile, StartOutcome, TransferMetadata, TransferState, UploadController,
    UploadError, UploadReceipt,
};
