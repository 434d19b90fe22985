//! Upload lifecycle owner.
//!
//! [`UploadController`] holds the selected file and the single
//! [`TransferState`]. Starting an upload spawns one task that drives the
//! [`Transport`] and feeds a per-transfer event channel; the controller applies
//! those events on the caller's side through [`UploadController::sync`],
//! [`UploadController::next_update`] or [`UploadController::wait_for_outcome`].
//!
//! Selecting a file while a transfer is running is allowed. The running
//! transfer is not cancelled, but its channel is dropped, so whatever it still
//! reports lands nowhere and cannot touch the new state.

use std::sync::Arc;

use flume::{Receiver, Sender, TryRecvError};

use super::error::UploadError;
use super::progress::ProgressTracker;
use super::types::{SelectedFile, StartOutcome, TransferMetadata, TransferState, UploadReceipt};
use crate::UploadConfig;
use crate::http::{
    ProgressSink, ReqwestTransport, Response, TransferEvent, Transport, TransportError,
    UploadRequest,
};

#[derive(Debug)]
pub struct UploadController<T: Transport = ReqwestTransport> {
    transport: Arc<T>,
    config: UploadConfig,
    metadata: TransferMetadata,
    file: Option<SelectedFile>,
    state: TransferState,
    tracker: ProgressTracker,
    /// Events of the transfer in flight, if any.
    inbox: Option<Receiver<TransferEvent>>,
    watchers: Vec<Sender<TransferState>>,
}

impl UploadController<ReqwestTransport> {
    pub fn new(config: UploadConfig, metadata: TransferMetadata) -> Self {
        Self::with_transport(ReqwestTransport::new(), config, metadata)
    }
}

impl<T: Transport> UploadController<T> {
    pub fn with_transport(transport: T, config: UploadConfig, metadata: TransferMetadata) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
            metadata,
            file: None,
            state: TransferState::Idle,
            tracker: ProgressTracker::new(),
            inbox: None,
            watchers: Vec::new(),
        }
    }

    pub fn state(&self) -> &TransferState {
        &self.state
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn metadata(&self) -> &TransferMetadata {
        &self.metadata
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn progress_percent(&self) -> u8 {
        self.state.progress_percent()
    }

    pub fn is_uploading(&self) -> bool {
        self.state.is_in_flight()
    }

    /// Receive every state transition from now on, in order.
    pub fn subscribe(&mut self) -> Receiver<TransferState> {
        let (tx, rx) = flume::unbounded();
        self.watchers.push(tx);
        rx
    }

    /// Choose (or clear) the file to upload.
    ///
    /// Resets progress and discards the outcome of any transfer in flight.
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        if self.inbox.take().is_some() {
            log::info!("New file selected mid-upload, discarding the running transfer's outcome");
        }
        self.tracker.reset();
        let next = if file.is_some() {
            TransferState::Ready
        } else {
            TransferState::Idle
        };
        self.file = file;
        self.transition(next);
    }

    /// Back to `Idle` with no file, as when the hosting view goes away.
    pub fn reset(&mut self) {
        self.select_file(None);
    }

    /// Dispatch the selected file.
    ///
    /// Must be called from within a tokio runtime; the request runs on a
    /// spawned task and reports back through [`Self::sync`] and friends.
    pub fn start_upload(&mut self) -> StartOutcome {
        if self.state.is_in_flight() {
            log::debug!("Upload already in progress, ignoring start request");
            return StartOutcome::AlreadyInProgress;
        }

        let Some(file) = self.file.clone() else {
            log::debug!("Upload requested without a file");
            self.transition(TransferState::Failed(UploadError::NoFileSelected));
            return StartOutcome::Rejected;
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Cannot dispatch upload without an async runtime: {e}");
                self.transition(TransferState::Failed(UploadError::unexpected(e.to_string())));
                return StartOutcome::Rejected;
            }
        };

        let request = UploadRequest::new(&self.config, &self.metadata, file);
        let (sink, inbox) = ProgressSink::channel();
        let transport = Arc::clone(&self.transport);

        log::info!(
            "Starting upload of {} to {}",
            request.file().name(),
            request.url()
        );
        runtime.spawn(async move {
            let result = transport.send(request, sink.clone()).await;
            sink.finish(result);
        });

        self.inbox = Some(inbox);
        self.tracker.reset();
        self.transition(TransferState::InFlight(0));
        StartOutcome::Started
    }

    /// Apply every event already delivered, without waiting.
    pub fn sync(&mut self) {
        while let Some(inbox) = &self.inbox {
            match inbox.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.lost_transfer(),
            }
        }
    }

    /// Wait for the in-flight transfer to report something, apply it, and
    /// return the state if it changed. `None` once nothing is in flight.
    pub async fn next_update(&mut self) -> Option<TransferState> {
        loop {
            let inbox = self.inbox.clone()?;
            let before = self.state.clone();
            match inbox.recv_async().await {
                Ok(event) => self.apply(event),
                Err(_) => self.lost_transfer(),
            }
            if self.state != before {
                return Some(self.state.clone());
            }
        }
    }

    /// Drive the transfer in flight to its terminal state.
    pub async fn wait_for_outcome(&mut self) -> TransferState {
        while self.next_update().await.is_some() {}
        self.state.clone()
    }

    fn apply(&mut self, event: TransferEvent) {
        if !self.state.is_in_flight() {
            return;
        }

        match event {
            TransferEvent::Progress {
                bytes_sent,
                total_bytes,
            } => {
                if let Some(percent) = self.tracker.observe(bytes_sent, total_bytes) {
                    self.transition(TransferState::InFlight(percent));
                }
            }
            TransferEvent::Completed(response) => {
                self.inbox = None;
                self.complete(&response);
            }
            TransferEvent::Failed(err) => {
                self.inbox = None;
                let error = match err {
                    TransportError::Network(detail) => {
                        log::warn!("Upload failed before a response arrived: {detail}");
                        UploadError::network(detail)
                    }
                    TransportError::Unexpected(detail) => {
                        log::error!("Upload could not be dispatched: {detail}");
                        UploadError::unexpected(detail)
                    }
                };
                self.transition(TransferState::Failed(error));
            }
        }
    }

    fn complete(&mut self, response: &Response) {
        if response.is_success() {
            let receipt = match response.json::<UploadReceipt>() {
                Ok(receipt) => Some(receipt),
                Err(e) => {
                    log::debug!("Upload acknowledged without a readable receipt: {e}");
                    None
                }
            };
            log::info!("Upload accepted with status {}", response.status);
            self.transition(TransferState::Succeeded(receipt));
        } else {
            log::warn!(
                "Upload rejected with status {} {}",
                response.status,
                response.status_text
            );
            self.transition(TransferState::Failed(UploadError::ServerRejection {
                status: response.status,
                status_text: response.status_text.clone(),
            }));
        }
    }

    /// The transfer task went away without a terminal event (it panicked).
    fn lost_transfer(&mut self) {
        self.inbox = None;
        if self.state.is_in_flight() {
            log::error!("Upload task ended without reporting an outcome");
            self.transition(TransferState::Failed(UploadError::unexpected(
                "upload task ended without reporting an outcome",
            )));
        }
    }

    fn transition(&mut self, next: TransferState) {
        log::debug!("Transfer state: {:?} -> {:?}", self.state, next);
        self.state = next;
        let state = &self.state;
        self.watchers.retain(|tx| tx.send(state.clone()).is_ok());
    }
}
