use futures::StreamExt;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::constants::USER_AGENT;

/// Progress callback invoked with `(bytes_downloaded, total_bytes)`.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(u64, u64) + Send);

/// Stream a URL to a local file.
///
/// The response body is consumed chunk by chunk into memory, with the
/// progress callback invoked after each chunk when `Content-Length` is known
/// and greater than zero (no spurious `0/0` reports when it is not). Parent
/// directories of `dest` are created as needed, and the complete buffer is
/// written to `dest` in a single write only after the stream finishes - a
/// failure mid-stream discards the partial buffer and never touches the
/// destination path.
///
/// Returns `false` on any non-2xx response or stream error; never panics or
/// propagates an error across this boundary.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    mut on_progress: Option<ProgressFn<'_>>,
) -> bool {
    let response = match client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            debug!("Download request failed: {e}");
            return false;
        }
    };

    if !response.status().is_success() {
        debug!("Download failed with status {}", response.status());
        return false;
    }

    let total = response.content_length().unwrap_or(0);
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                downloaded += bytes.len() as u64;
                buffer.extend_from_slice(&bytes);
                if total > 0 {
                    if let Some(callback) = on_progress.as_mut() {
                        callback(downloaded, total);
                    }
                }
            }
            Err(e) => {
                debug!("Download stream error: {e}");
                return false;
            }
        }
    }

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent).await {
                debug!("Failed to create directory {}: {e}", parent.display());
                return false;
            }
        }
    }

    if let Err(e) = fs::write(dest, &buffer).await {
        debug!("Failed to write download to {}: {e}", dest.display());
        return false;
    }

    true
}
