//! `palabra upload`: send one book to the ingestion API.

use anyhow::{Context as _, Result};
use palabra_business::{
    SelectedFile, StartOutcome, TransferMetadata, TransferState, UploadConfig, UploadController,
};
use tracing::{info, instrument};

use crate::cli::UploadArgs;
use crate::output::Output;

/// `--api-url` wins over `PALABRA_API_URL`, which wins over the default.
fn resolve_config(api_url: Option<&str>) -> Result<UploadConfig> {
    match api_url {
        Some(url) => Ok(UploadConfig::new(url)),
        None => UploadConfig::from_env().context("Failed to read upload configuration"),
    }
}

/// Upload the file and return the terminal state reached.
///
/// Local problems (unreadable file, bad environment) are errors; upload
/// failures are reported through the returned state.
#[instrument(skip_all, name = "upload", fields(file = %args.file.display()))]
pub async fn run_upload(args: &UploadArgs, out: &Output) -> Result<TransferState> {
    let config = resolve_config(args.api_url.as_deref())?;
    let file = SelectedFile::open(&args.file).await?;
    info!(
        "Uploading {} ({} bytes, {}) to {}",
        file.name(),
        file.len(),
        file.mime_type(),
        config.upload_url()
    );

    let metadata = TransferMetadata::new(args.user_id.as_str(), args.language.as_str());
    let mut controller = UploadController::new(config, metadata);
    let label = file.name().to_owned();
    controller.select_file(Some(file));

    if controller.start_upload() != StartOutcome::Started {
        let state = controller.state().clone();
        out.error(state.message());
        return Ok(state);
    }

    out.progress(&label, 0);
    while let Some(state) = controller.next_update().await {
        if let TransferState::InFlight(percent) = state {
            out.progress(&label, percent);
        }
    }
    out.finish_progress();

    let state = controller.state().clone();
    report(out, &state);
    Ok(state)
}

fn report(out: &Output, state: &TransferState) {
    match state {
        TransferState::Succeeded(receipt) => {
            out.success(state.message());
            if let Some(receipt) = receipt {
                out.labeled_indent("ID", &receipt.id, 2);
                out.labeled_indent("Stored as", &receipt.filename, 2);
            }
        }
        TransferState::Failed(err) => {
            out.error(state.message());
            if let Some(detail) = err.detail() {
                tracing::debug!("Upload failure detail: {detail}");
            }
        }
        TransferState::Idle | TransferState::Ready | TransferState::InFlight(_) => {
            out.info(format!("Upload ended in state {state:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palabra_business::UploadError;
    use std::path::PathBuf;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const RECEIPT_JSON: &str = r#"{"status":"uploaded","id":"c0ffee00-0000-4000-8000-000000000000","filename":"c0ffee00-0000-4000-8000-000000000000.txt"}"#;

    fn args(file: PathBuf, api_url: &str) -> UploadArgs {
        UploadArgs {
            file,
            api_url: Some(api_url.to_owned()),
            user_id: "1".to_owned(),
            language: "es".to_owned(),
        }
    }

    fn book(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("la_celestina.txt");
        std::fs::write(&path, "Calisto y Melibea").expect("write book");
        path
    }

    #[test]
    fn explicit_api_url_is_used() {
        let config = resolve_config(Some("https://api.palabra.test/")).expect("config");
        assert_eq!(config.upload_url(), "https://api.palabra.test/api/books/upload");
    }

    #[tokio::test]
    async fn uploads_book_and_returns_receipt() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/books/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(RECEIPT_JSON, "application/json"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let state = run_upload(&args(book(&dir), &mock_server.uri()), &Output::new())
            .await
            .expect("upload should run");

        let receipt = state.receipt().expect("receipt");
        assert_eq!(receipt.id, "c0ffee00-0000-4000-8000-000000000000");

        let requests = mock_server.received_requests().await.expect("recording");
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("filename=\"la_celestina.txt\""));
        assert!(body.contains("Calisto y Melibea"));
    }

    #[tokio::test]
    async fn server_failure_is_a_failed_state_not_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let state = run_upload(&args(book(&dir), &mock_server.uri()), &Output::new())
            .await
            .expect("upload should run");

        assert_eq!(
            state,
            TransferState::Failed(UploadError::ServerRejection {
                status: 502,
                status_text: "Bad Gateway".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn missing_file_is_an_error_and_sends_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let result = run_upload(
            &args(PathBuf::from("/no/such/libro.epub"), &mock_server.uri()),
            &Output::new(),
        )
        .await;

        assert!(result.is_err());
    }
}
