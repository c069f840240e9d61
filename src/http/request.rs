//! HTTP/1.1 request construction and serialization.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::{DEFAULT_REQUEST_HEADERS, HEADER_COOKIE, HEADER_HOST, HEADER_RANGE};
use crate::url::UrlComponents;

/// Header map keyed by exact (case-sensitive) header name.
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to be written to a connection.
///
/// Every request carries `Host`, `Accept`, `Accept-Encoding: gzip`,
/// `Cache-Control: no-cache` and `Connection: close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub domain_name: String,
    pub port: u16,
    pub uri: String,
    pub headers: Headers,
}

impl HttpRequest {
    pub fn new(method: Method, target: &UrlComponents) -> Self {
        let mut request = Self {
            method,
            domain_name: target.domain_name.clone(),
            port: target.port,
            uri: target.uri.clone(),
            headers: Headers::new(),
        };
        let host = if target.port == target.protocol.default_port() {
            target.domain_name.clone()
        } else {
            format!("{}:{}", target.domain_name, target.port)
        };
        request.headers.insert(HEADER_HOST.to_string(), host);
        for (name, value) in DEFAULT_REQUEST_HEADERS {
            request.headers.insert(name.to_string(), value.to_string());
        }
        request
    }

    /// Echoes an aggregated cookie string; empty cookies are not sent.
    pub fn with_cookie(mut self, cookie: &str) -> Self {
        if !cookie.is_empty() {
            self.headers
                .insert(HEADER_COOKIE.to_string(), cookie.to_string());
        }
        self
    }

    /// Asks for the inclusive byte range `from..=to`.
    pub fn with_range(mut self, from: u64, to: u64) -> Self {
        self.headers
            .insert(HEADER_RANGE.to_string(), format!("bytes={from}-{to}"));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} HTTP/1.1\r\n", self.method, self.uri)?;
        for (name, value) in &self.headers {
            write!(f, "{name}: {value}\r\n")?;
        }
        f.write_str("\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::parse_url;

    #[test]
    fn test_default_headers_present() {
        let target = parse_url("http://example.com/index.html").unwrap();
        let request = HttpRequest::new(Method::Get, &target);
        assert_eq!(request.header("Host"), Some("example.com"));
        assert_eq!(request.header("Accept"), Some("*/*"));
        assert_eq!(request.header("Accept-Encoding"), Some("gzip"));
        assert_eq!(request.header("Cache-Control"), Some("no-cache"));
        assert_eq!(request.header("Connection"), Some("close"));
        assert_eq!(request.header("Cookie"), None);
    }

    #[test]
    fn test_host_includes_non_default_port() {
        let target = parse_url("https://example.com:8443/").unwrap();
        let request = HttpRequest::new(Method::Get, &target);
        assert_eq!(request.header("Host"), Some("example.com:8443"));
    }

    #[test]
    fn test_serialization_layout() {
        let target = parse_url("http://example.com/a?b=c").unwrap();
        let text = HttpRequest::new(Method::Head, &target)
            .with_cookie("sid=1; theme=dark")
            .to_string();
        assert!(text.starts_with("HEAD /a?b=c HTTP/1.1\r\n"));
        assert!(text.contains("\r\nCookie: sid=1; theme=dark\r\n"));
        assert!(text.contains("\r\nHost: example.com\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
        // request line + 6 headers + blank line
        assert_eq!(text.matches("\r\n").count(), 8);
    }

    #[test]
    fn test_empty_cookie_is_not_sent() {
        let target = parse_url("http://example.com/").unwrap();
        let request = HttpRequest::new(Method::Get, &target).with_cookie("");
        assert!(!request.headers.contains_key("Cookie"));
    }

    #[test]
    fn test_range_header() {
        let target = parse_url("http://example.com/big.iso").unwrap();
        let request = HttpRequest::new(Method::Get, &target).with_range(0, 9_999_999);
        assert_eq!(request.header("Range"), Some("bytes=0-9999999"));
    }

    #[test]
    fn test_request_line_reproduces_parsed_path() {
        for (url, line) in [
            ("http://example.com", "GET / HTTP/1.1\r\n"),
            ("http://example.com/x/y.txt", "GET /x/y.txt HTTP/1.1\r\n"),
            ("https://example.com:444/q?z=1", "GET /q?z=1 HTTP/1.1\r\n"),
        ] {
            let target = parse_url(url).unwrap();
            let text = HttpRequest::new(Method::Get, &target).to_string();
            assert!(text.starts_with(line), "{url} produced {text:?}");
        }
    }
}
