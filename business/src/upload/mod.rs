mod controller;
mod error;
mod progress;
mod types;

pub use controller::UploadController;
pub use error::{FileError, UploadError};
pub use progress::{ProgressTracker, percent_of};
pub use types::{
    SUCCESS_MESSAGE, SelectedFile, StartOutcome, TransferMetadata, TransferState,
    UPLOADING_MESSAGE, UploadReceipt,
};
