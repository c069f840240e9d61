//! Parallel ranged download.
//!
//! A large resource is split into `RANGED_DOWNLOAD_SEGMENTS` byte ranges, each
//! fetched by its own worker over its own connection and written at its
//! offset in one pre-sized scratch file. The coordinator waits until every
//! worker reports success or the first one reports failure.
//!
//! On failure the shared token is cancelled. Workers check it before touching
//! the file, so a write that already started may still land; the scratch file
//! is discarded in that case anyway.

use std::io::SeekFrom;
use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::RANGED_DOWNLOAD_SEGMENTS;
use crate::error_handling::FetchError;
use crate::fetch::transport::Transport;
use crate::http::{HttpRequest, HttpResponse, Method};
use crate::url::UrlComponents;

const PARTIAL_CONTENT: u16 = 206;

/// One inclusive byte range of the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub from: u64,
    pub to: u64,
}

impl Segment {
    pub fn length(&self) -> u64 {
        self.to - self.from + 1
    }
}

/// Splits `[0, content_length)` into `count` contiguous segments.
///
/// Every segment but the last is `content_length / count` bytes; the last one
/// absorbs the remainder. Fewer segments are produced when the resource has
/// fewer bytes than `count`, and none for an empty resource.
pub fn plan_segments(content_length: u64, count: u64) -> Vec<Segment> {
    if content_length == 0 {
        return Vec::new();
    }
    let count = count.clamp(1, content_length);
    let size = content_length / count;

    (0..count)
        .map(|i| Segment {
            index: i as usize,
            from: i * size,
            to: if i == count - 1 {
                content_length - 1
            } else {
                (i + 1) * size - 1
            },
        })
        .collect()
}

/// Returns the content length when a HEAD response qualifies for a ranged
/// download: status 200, range support advertised, and at least `threshold`
/// bytes (and at least one byte per segment).
pub fn ranged_length(head: &HttpResponse, threshold: u64) -> Option<u64> {
    if head.status_code != 200 || !head.accepts_ranges() {
        return None;
    }
    head.content_length()
        .filter(|&length| length >= threshold.max(RANGED_DOWNLOAD_SEGMENTS))
}

/// Downloads `content_length` bytes of `target` in parallel segments and
/// returns the assembled body.
///
/// # Errors
///
/// Returns the first `RangedDownloadSegment` error reported by a worker, or
/// `ScratchFile` when the assembly file cannot be created or read back.
pub(crate) async fn download(
    transport: &Transport,
    target: &UrlComponents,
    cookie: &str,
    content_length: u64,
) -> Result<Vec<u8>, FetchError> {
    let scratch = NamedTempFile::new()?;
    scratch.as_file().set_len(content_length)?;

    let segments = plan_segments(content_length, RANGED_DOWNLOAD_SEGMENTS);
    let total = segments.len();
    info!(
        "Starting ranged download of {} bytes from {} in {} segments",
        content_length, target, total
    );

    let token = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(total.max(1));
    for segment in segments {
        let tx = tx.clone();
        let token = token.clone();
        let transport = transport.clone();
        let target = target.clone();
        let cookie = cookie.to_string();
        let path = scratch.path().to_path_buf();
        tokio::spawn(async move {
            let result = fetch_segment(&transport, &target, &cookie, segment, &path, &token)
                .await
                .map_err(|e| FetchError::RangedDownloadSegment {
                    index: segment.index,
                    source: Box::new(e),
                });
            // The coordinator stops listening after the first failure
            let _ = tx.send(result).await;
        });
    }
    drop(tx);

    let mut completed = 0;
    while completed < total {
        match rx.recv().await {
            Some(Ok(())) => completed += 1,
            Some(Err(e)) => {
                token.cancel();
                return Err(e);
            }
            None => {
                return Err(FetchError::HttpTransport(format!(
                    "ranged download worker exited after {completed} of {total} segments"
                )))
            }
        }
    }

    let body = tokio::fs::read(scratch.path()).await?;
    info!("Finished ranged download of {} bytes", body.len());
    Ok(body)
}

async fn fetch_segment(
    transport: &Transport,
    target: &UrlComponents,
    cookie: &str,
    segment: Segment,
    path: &Path,
    token: &CancellationToken,
) -> Result<(), FetchError> {
    let request = HttpRequest::new(Method::Get, target)
        .with_cookie(cookie)
        .with_range(segment.from, segment.to);
    let (response, _) = transport.send_with_fallback(target, &request).await?;

    if response.status_code != PARTIAL_CONTENT {
        return Err(FetchError::UnexpectedStatus {
            expected: PARTIAL_CONTENT,
            actual: response.status_code,
        });
    }
    if response.body.len() as u64 != segment.length() {
        return Err(FetchError::MalformedResponse(format!(
            "segment {} expected {} bytes, got {}",
            segment.index,
            segment.length(),
            response.body.len()
        )));
    }

    if token.is_cancelled() {
        debug!("Segment {} not written: download abandoned", segment.index);
        return Ok(());
    }
    let mut file = OpenOptions::new().write(true).open(path).await?;
    file.seek(SeekFrom::Start(segment.from)).await?;
    file.write_all(&response.body).await?;
    file.flush().await?;
    debug!(
        "Segment {} wrote bytes {}-{}",
        segment.index, segment.from, segment.to
    );
    Ok(())
}
