//! HTTP header name constants.
//!
//! Header names are matched case-sensitively, exactly as written here.

// Request headers
pub const HEADER_HOST: &str = "Host";
pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const HEADER_CACHE_CONTROL: &str = "Cache-Control";
pub const HEADER_CONNECTION: &str = "Connection";
pub const HEADER_COOKIE: &str = "Cookie";
pub const HEADER_RANGE: &str = "Range";

// Response headers
pub const HEADER_SET_COOKIE: &str = "Set-Cookie";
pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";
pub const HEADER_LOCATION: &str = "Location";
pub const HEADER_TRANSFER_ENCODING: &str = "Transfer-Encoding";
pub const HEADER_CONTENT_ENCODING: &str = "Content-Encoding";
pub const HEADER_ACCEPT_RANGES: &str = "Accept-Ranges";

/// Default headers sent with every request, as (name, value) pairs.
/// `Host` is added separately because it depends on the target.
pub const DEFAULT_REQUEST_HEADERS: &[(&str, &str)] = &[
    (HEADER_ACCEPT, "*/*"),
    (HEADER_ACCEPT_ENCODING, "gzip"),
    (HEADER_CACHE_CONTROL, "no-cache"),
    (HEADER_CONNECTION, "close"),
];
