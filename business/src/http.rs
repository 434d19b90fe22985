//! HTTP transport for book uploads.
//!
//! The controller never talks to reqwest directly. It hands an [`UploadRequest`]
//! to a [`Transport`] together with a [`ProgressSink`]; the transport reports
//! byte-level progress into the sink while the file part streams out, and the
//! task driving it finishes the sink with exactly one terminal event.
//!
//! Progress and terminal events travel over one flume channel per transfer, so
//! the receiver observes them in the order they were produced.

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use flume::{Receiver, Sender};
use futures::{Stream, StreamExt as _};
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::UploadConfig;
use crate::upload::{SelectedFile, TransferMetadata};

/// Multipart field carrying the file bytes.
pub const FILE_FIELD: &str = "file";

/// Size of the slices the file body is handed to the connection in.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A simplified HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Canonical reason phrase for `status`, or the bare code when it has none.
    pub status_text: String,
    pub body: Vec<u8>,
}

impl Response {
    /// Returns true if the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Failure before any HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connectivity: DNS, connect, timeout, broken body stream.
    #[error("network error: {0}")]
    Network(String),
    /// The request could not be built or dispatched.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Unexpected(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// One notification from a running transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Progress {
        bytes_sent: u64,
        total_bytes: Option<u64>,
    },
    Completed(Response),
    Failed(TransportError),
}

/// Sending half of a transfer's event channel.
///
/// Sends never fail loudly: once the controller has dropped the receiving half
/// (new file selected, outcome already applied) events are discarded.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: Sender<TransferEvent>,
}

impl ProgressSink {
    pub fn channel() -> (Self, Receiver<TransferEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    pub fn report(&self, bytes_sent: u64, total_bytes: Option<u64>) {
        log::debug!("Upload progress: {bytes_sent} of {total_bytes:?} bytes");
        self.emit(TransferEvent::Progress {
            bytes_sent,
            total_bytes,
        });
    }

    /// Deliver the terminal event. Consumes the sink so it fires once.
    pub fn finish(self, result: Result<Response, TransportError>) {
        let event = match result {
            Ok(response) => TransferEvent::Completed(response),
            Err(err) => TransferEvent::Failed(err),
        };
        self.emit(event);
    }

    fn emit(&self, event: TransferEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Transfer event dropped, nobody is listening anymore");
        }
    }
}

/// Everything needed to send one book: target URL, form fields and the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    url: String,
    fields: Vec<(String, String)>,
    file: SelectedFile,
}

impl UploadRequest {
    pub fn new(config: &UploadConfig, metadata: &TransferMetadata, file: SelectedFile) -> Self {
        let fields = metadata
            .fields()
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect();
        Self {
            url: config.upload_url(),
            fields,
            file,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    /// Build the multipart form: text fields first, then the file part, whose
    /// body reports progress into `progress` as it is consumed.
    pub fn into_form(self, progress: ProgressSink) -> Result<Form, TransportError> {
        let total = self.file.len();
        let stream = progress_stream(self.file.data().clone(), progress);
        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(self.file.name().to_owned())
            .mime_str(self.file.mime_type())?;

        let form = self
            .fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        Ok(form.part(FILE_FIELD, part))
    }
}

/// Slices `data` into [`CHUNK_SIZE`] pieces, reporting the cumulative count
/// each time a piece is pulled.
pub fn progress_stream(
    data: Bytes,
    progress: ProgressSink,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static {
    let total = data.len() as u64;
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(CHUNK_SIZE)
        .map(|start| data.slice(start..(start + CHUNK_SIZE).min(data.len())))
        .collect();

    let mut sent = 0_u64;
    futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        progress.report(sent, Some(total));
        Ok(chunk)
    })
}

/// Sends one upload request.
///
/// Implementations report progress through the sink but never call
/// [`ProgressSink::finish`]; the caller does that with the returned result.
#[async_trait]
pub trait Transport: Send + Sync + Debug + 'static {
    async fn send(
        &self,
        request: UploadRequest,
        progress: ProgressSink,
    ) -> Result<Response, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: UploadRequest,
        progress: ProgressSink,
    ) -> Result<Response, TransportError> {
        let url = request.url().to_owned();
        log::info!(
            "POST {url} ({}, {} bytes)",
            request.file().name(),
            request.file().len()
        );

        let form = request.into_form(progress)?;
        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        let status_text = status
            .canonical_reason()
            .map_or_else(|| status.as_str().to_owned(), str::to_owned);

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                log::debug!("Failed to read upload response body: {e}");
                Vec::new()
            }
        };

        Ok(Response {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}
