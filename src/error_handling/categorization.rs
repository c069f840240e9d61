//! Error categorization.
//!
//! Maps every `FetchError` to an `ErrorKind` and answers which layer a
//! failure came from.

use super::types::{ErrorKind, FetchError};

impl FetchError {
    /// Categorizes the error into an `ErrorKind`.
    ///
    /// Segment failures keep their own kind regardless of the wrapped cause, so
    /// callers can tell a ranged download failure apart from the single-stream
    /// request that follows it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            FetchError::UnsupportedProtocol(_) => ErrorKind::UnsupportedProtocol,
            FetchError::DnsTransport(_) => ErrorKind::DnsTransport,
            FetchError::DnsProtocol(_) => ErrorKind::DnsProtocol,
            FetchError::AddressResolution { ipv4, ipv6 } => {
                // Protocol errors are more telling than timeouts
                if ipv4.is_dns_protocol() || ipv6.is_dns_protocol() {
                    ErrorKind::DnsProtocol
                } else {
                    ErrorKind::DnsTransport
                }
            }
            FetchError::NoAddress(_) | FetchError::HttpTransport(_) => ErrorKind::HttpTransport,
            FetchError::MalformedResponse(_)
            | FetchError::MalformedStatusLine(_)
            | FetchError::MalformedHeader(_) => ErrorKind::MalformedResponse,
            FetchError::MalformedChunkedBody(_) => ErrorKind::MalformedChunkedBody,
            FetchError::MalformedCompressedBody(_) => ErrorKind::MalformedCompressedBody,
            FetchError::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
            FetchError::TooManyRedirects(_) => ErrorKind::TooManyRedirects,
            FetchError::RangedDownloadSegment { .. } | FetchError::ScratchFile(_) => {
                ErrorKind::RangedDownloadSegment
            }
        }
    }

    /// Returns true for failures raised while resolving a host name.
    pub fn is_dns(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::DnsTransport | ErrorKind::DnsProtocol
        )
    }

    /// Returns true for connect/TLS/write/read/timeout failures.
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::HttpTransport
    }

    fn is_dns_protocol(&self) -> bool {
        matches!(self, FetchError::DnsProtocol(_))
    }
}
