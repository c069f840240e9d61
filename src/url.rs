//! URL parsing.
//!
//! Decomposes `scheme://host[:port][/path]` into the pieces the fetcher needs.
//! User info and `#fragment` are accepted and dropped; neither goes on the
//! wire. Resolved addresses are attached later by the DNS resolver.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{HTTPS_DEFAULT_PORT, HTTP_DEFAULT_PORT};
use crate::error_handling::FetchError;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)://(?:[^/?#@\s]*@)?([^/:?#@\s]+)(?::(\d*))?([/?][^#\s]*)?(?:#\S*)?$")
        .unwrap_or_else(|e| panic!("URL pattern must compile: {e}"))
});

/// Supported URL schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Http => HTTP_DEFAULT_PORT,
            Protocol::Https => HTTPS_DEFAULT_PORT,
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Protocol::Https)
    }
}

impl FromStr for Protocol {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(FetchError::UnsupportedProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed URL plus the addresses resolved for its host.
///
/// `port` is always populated and `uri` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlComponents {
    pub protocol: Protocol,
    pub domain_name: String,
    pub port: u16,
    /// Path and query, `/` when the URL has none.
    pub uri: String,
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

impl UrlComponents {
    /// True once at least one address family is populated.
    pub fn is_resolved(&self) -> bool {
        self.ipv4.is_some() || self.ipv6.is_some()
    }

    /// Records `ip` in the matching family slot.
    pub fn set_address(&mut self, ip: IpAddr) {
        match ip {
            IpAddr::V4(v4) => self.ipv4 = Some(v4),
            IpAddr::V6(v6) => self.ipv6 = Some(v6),
        }
    }

    /// Candidate addresses in connection order: IPv6 first, then IPv4.
    pub fn addresses(&self) -> Vec<IpAddr> {
        self.ipv6
            .map(IpAddr::V6)
            .into_iter()
            .chain(self.ipv4.map(IpAddr::V4))
            .collect()
    }

    /// Resolves a redirect `Location` against this URL.
    ///
    /// Absolute locations go through [`parse_url`]; a location starting with
    /// `/` keeps the current scheme, host and port. Addresses are never
    /// carried over here; the redirect loop decides whether to reuse them.
    pub fn join(&self, location: &str) -> Result<UrlComponents, FetchError> {
        if location.starts_with('/') && !location.starts_with("//") {
            let path = location.split_once('#').map_or(location, |(path, _)| path);
            return Ok(UrlComponents {
                protocol: self.protocol,
                domain_name: self.domain_name.clone(),
                port: self.port,
                uri: path.to_string(),
                ipv4: None,
                ipv6: None,
            });
        }
        parse_url(location)
    }
}

impl fmt::Display for UrlComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.domain_name)?;
        if self.port != self.protocol.default_port() {
            write!(f, ":{}", self.port)?;
        }
        f.write_str(&self.uri)
    }
}

/// Parses a raw URL string.
///
/// # Errors
///
/// - `InvalidUrl` when the input does not match `scheme://host(:port)?(/path)?`
///   or the port is out of range
/// - `UnsupportedProtocol` when the scheme is neither `http` nor `https`
///
/// A host that is an IPv4 literal is recorded as already resolved.
pub fn parse_url(raw: &str) -> Result<UrlComponents, FetchError> {
    let raw = raw.trim();
    let captures = URL_PATTERN
        .captures(raw)
        .ok_or_else(|| FetchError::InvalidUrl(raw.to_string()))?;

    let protocol: Protocol = captures[1].parse()?;
    let domain_name = captures[2].to_string();

    // An empty port (`host:`) means the scheme default
    let port = match captures.get(3).filter(|port| !port.as_str().is_empty()) {
        Some(port) => port
            .as_str()
            .parse::<u16>()
            .map_err(|_| FetchError::InvalidUrl(raw.to_string()))?,
        None => protocol.default_port(),
    };

    let uri = match captures.get(4).map(|m| m.as_str()) {
        None | Some("") => "/".to_string(),
        Some(query) if query.starts_with('?') => format!("/{query}"),
        Some(path) => path.to_string(),
    };

    Ok(UrlComponents {
        protocol,
        ipv4: domain_name.parse::<Ipv4Addr>().ok(),
        domain_name,
        port,
        uri,
        ipv6: None,
    })
}
