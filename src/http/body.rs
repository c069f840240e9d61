//! Body decoding: chunked transfer-encoding and gzip content-encoding.
//!
//! Chunked framing is removed first, then gzip is inflated. Either, both or
//! neither may apply; with neither the body passes through unchanged.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::config::{HEADER_CONTENT_ENCODING, HEADER_TRANSFER_ENCODING};
use crate::error_handling::FetchError;
use crate::http::request::Headers;
use crate::http::response::find;

/// True when the comma-separated header value lists `coding`.
fn lists_coding(headers: &Headers, name: &str, coding: &str) -> bool {
    headers.get(name).is_some_and(|value| {
        value
            .split(',')
            .any(|item| item.trim().eq_ignore_ascii_case(coding))
    })
}

/// Decodes `raw` according to the response's `Transfer-Encoding` and
/// `Content-Encoding` headers.
pub fn decode_body(headers: &Headers, raw: &[u8]) -> Result<Vec<u8>, FetchError> {
    let chunked = lists_coding(headers, HEADER_TRANSFER_ENCODING, "chunked");
    let gzipped = lists_coding(headers, HEADER_CONTENT_ENCODING, "gzip");

    let body = if chunked {
        decode_chunked(raw)?
    } else {
        raw.to_vec()
    };
    if gzipped {
        decode_gzip(&body)
    } else {
        Ok(body)
    }
}

/// Reverses chunked transfer-encoding.
///
/// Each chunk is a hex size line, the payload and a trailing CRLF; a zero size
/// ends the body. Chunk extensions after `;` are ignored and trailers after
/// the last chunk are dropped.
pub fn decode_chunked(mut raw: &[u8]) -> Result<Vec<u8>, FetchError> {
    let mut decoded = Vec::new();
    loop {
        let line_end = find(raw, b"\r\n").ok_or_else(|| {
            FetchError::MalformedChunkedBody("missing chunk size line".to_string())
        })?;
        let size_line = String::from_utf8_lossy(&raw[..line_end]);
        let size_text = size_line.split(';').next().unwrap_or_default().trim();
        let size = i64::from_str_radix(size_text, 16).map_err(|e| {
            FetchError::MalformedChunkedBody(format!("invalid chunk size {size_text:?}: {e}"))
        })?;
        if size < 0 {
            return Err(FetchError::MalformedChunkedBody(format!(
                "negative chunk size {size}"
            )));
        }
        if size == 0 {
            return Ok(decoded);
        }

        raw = &raw[line_end + 2..];
        let size = size as usize;
        let payload = raw.get(..size).ok_or_else(|| {
            FetchError::MalformedChunkedBody(format!(
                "chunk declares {size} bytes but only {} remain",
                raw.len()
            ))
        })?;
        decoded.extend_from_slice(payload);
        raw = raw.get(size + 2..).unwrap_or_default();
    }
}

/// Inflates a complete gzip stream.
pub fn decode_gzip(raw: &[u8]) -> Result<Vec<u8>, FetchError> {
    let mut decoder = GzDecoder::new(raw);
    let mut decoded = Vec::new();
    decoder
        .read_to_end(&mut decoded)
        .map_err(|e| FetchError::MalformedCompressedBody(e.to_string()))?;
    Ok(decoded)
}
