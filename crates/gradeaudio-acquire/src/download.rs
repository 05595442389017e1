use crate::fetch::{FetchError, HttpFetcher};
use futures::StreamExt;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Bytes written per write call.
pub const CHUNK_SIZE: usize = 1024;

/// Logged error messages are cut to this many characters.
const ERROR_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("stream interrupted: {0}")]
    Stream(#[source] reqwest::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Downloaded { bytes: u64 },
    /// Destination already existed; no request was made.
    AlreadyPresent,
    /// Truncated error message.
    Failed(String),
}

/// Download `url` to `dest` unless `dest` already exists.
///
/// Existence of the path is the only completeness check; a file left
/// behind by an interrupted run counts as done.
pub async fn download_audio(fetcher: &HttpFetcher, url: &str, dest: &Path) -> DownloadOutcome {
    let name = display_name(dest);

    if fs::try_exists(dest).await.unwrap_or(false) {
        tracing::info!(file = %name, "File already exists, skipping");
        return DownloadOutcome::AlreadyPresent;
    }

    match stream_to_file(fetcher, url, dest).await {
        Ok(bytes) => {
            tracing::info!(file = %name, bytes, "Downloaded");
            DownloadOutcome::Downloaded { bytes }
        }
        Err(e) => {
            let reason = truncate_error(&e.to_string());
            tracing::warn!(file = %name, error = %reason, "Download failed");
            DownloadOutcome::Failed(reason)
        }
    }
}

async fn stream_to_file(
    fetcher: &HttpFetcher,
    url: &str,
    dest: &Path,
) -> Result<u64, DownloadError> {
    let response = fetcher.get_audio(url).await?;

    let mut file = fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(DownloadError::Stream)?;
        if chunk.is_empty() {
            continue;
        }
        for piece in chunk.chunks(CHUNK_SIZE) {
            file.write_all(piece).await?;
            written += piece.len() as u64;
        }
    }

    file.flush().await?;
    Ok(written)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn truncate_error(message: &str) -> String {
    message.chars().take(ERROR_PREVIEW_CHARS).collect()
}
