//! HTTP/1.1 response parsing.
//!
//! The raw bytes read until connection close are split into status line,
//! headers and body. `Set-Cookie` values are aggregated into one outgoing
//! cookie string for the next request in the chain.

use crate::config::{
    HEADER_ACCEPT_RANGES, HEADER_CONTENT_LENGTH, HEADER_LOCATION, HEADER_SET_COOKIE,
};
use crate::error_handling::FetchError;
use crate::http::body::decode_body;
use crate::http::request::{Headers, Method};

const CRLF: &[u8] = b"\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";

/// A parsed response.
///
/// `body` is fully decoded (chunking and gzip reversed). It is left empty for
/// HEAD requests and for redirects, whose bodies are never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_line: String,
    pub status_code: u16,
    pub headers: Headers,
    /// First segment of every `Set-Cookie`, joined with `; `.
    pub cookie: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parses a complete raw response to a `method` request.
    ///
    /// Redirect (301/302) and HEAD bodies are not decoded.
    pub fn parse(raw: &[u8], method: Method) -> Result<Self, FetchError> {
        let (mut response, raw_body) = Self::parse_head(raw)?;
        if method != Method::Head && !response.is_redirect() {
            response.body = decode_body(&response.headers, raw_body)?;
        }
        Ok(response)
    }

    /// Parses the status line and headers, returning the raw body that follows
    /// the blank line.
    pub fn parse_head(raw: &[u8]) -> Result<(Self, &[u8]), FetchError> {
        if count_occurrences(raw, CRLF) < 2 {
            return Err(FetchError::MalformedResponse(format!(
                "{} bytes without a status line and header block",
                raw.len()
            )));
        }

        let (head, raw_body) = match find(raw, HEADER_END) {
            Some(end) => (&raw[..end], &raw[end + HEADER_END.len()..]),
            None => (raw, &raw[raw.len()..]),
        };
        let head = String::from_utf8_lossy(head);
        let mut lines = head.split("\r\n");

        let status_line = lines.next().unwrap_or_default().to_string();
        let status_code = parse_status_line(&status_line)?;

        let mut headers = Headers::new();
        let mut cookie = String::new();
        for line in lines.filter(|line| !line.is_empty()) {
            let (name, value) = line
                .split_once(": ")
                .filter(|(name, value)| !name.is_empty() && !value.is_empty())
                .ok_or_else(|| FetchError::MalformedHeader(line.to_string()))?;

            if name == HEADER_SET_COOKIE {
                let first = value.split("; ").next().unwrap_or(value);
                cookie.push_str(first);
                cookie.push_str("; ");
            }
            headers.insert(name.to_string(), value.to_string());
        }
        if cookie.ends_with("; ") {
            cookie.truncate(cookie.len() - 2);
        }

        if let Some(length) = headers.get(HEADER_CONTENT_LENGTH) {
            if length.is_empty() || !length.bytes().all(|b| b.is_ascii_digit()) {
                return Err(FetchError::MalformedHeader(format!(
                    "{HEADER_CONTENT_LENGTH}: {length}"
                )));
            }
        }

        let response = Self {
            status_line,
            status_code,
            headers,
            cookie,
            body: Vec::new(),
        };
        Ok((response, raw_body))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status_code, 301 | 302)
    }

    pub fn location(&self) -> Option<&str> {
        self.header(HEADER_LOCATION)
    }

    /// The validated `Content-Length`, if advertised.
    pub fn content_length(&self) -> Option<u64> {
        self.header(HEADER_CONTENT_LENGTH)?.parse().ok()
    }

    /// True when `Accept-Ranges` is present and not `none`.
    pub fn accepts_ranges(&self) -> bool {
        self.header(HEADER_ACCEPT_RANGES)
            .is_some_and(|value| !value.trim().eq_ignore_ascii_case("none"))
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn parse_status_line(line: &str) -> Result<u16, FetchError> {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() < 3 {
        return Err(FetchError::MalformedStatusLine(line.to_string()));
    }
    tokens[1]
        .parse()
        .map_err(|_| FetchError::MalformedStatusLine(line.to_string()))
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}
