//! Stub resolution over UDP and the A/AAAA race.
//!
//! One query per address family is sent to a single upstream resolver. The two
//! families race: the first success wins, and resolution only fails when both
//! families fail.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use log::{debug, info};
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

use crate::config::{Config, DNS_RESPONSE_BUFFER_SIZE};
use crate::dns::message::{build_query, parse_response, RecordType};
use crate::error_handling::FetchError;
use crate::url::UrlComponents;

/// A stub resolver forwarding every lookup to one upstream server.
///
/// Holds no state between lookups; every call performs fresh queries.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    upstream: SocketAddr,
    timeout: Duration,
}

impl Resolver {
    pub fn new(upstream: SocketAddr, timeout: Duration) -> Self {
        Self { upstream, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resolver, config.dns_timeout())
    }

    pub fn upstream(&self) -> SocketAddr {
        self.upstream
    }

    /// Queries one address family for `domain`.
    ///
    /// The whole exchange (bind, send, receive) is bounded by the resolver
    /// timeout.
    pub async fn query(&self, domain: &str, record_type: RecordType) -> Result<IpAddr, FetchError> {
        let query_id: u16 = rand::random();
        let query = build_query(query_id, domain, record_type)?;
        debug!(
            "Sending {} query for {} to {} (id {:#06x})",
            record_type, domain, self.upstream, query_id
        );

        let response = tokio::time::timeout(self.timeout, self.exchange(&query))
            .await
            .map_err(|_| {
                FetchError::DnsTransport(format!(
                    "{} query for {} timed out after {}s",
                    record_type,
                    domain,
                    self.timeout.as_secs()
                ))
            })??;

        let ip = parse_response(&response, query_id, record_type)?;
        info!("Resolved {} address: {}", record_type.family(), ip);
        Ok(ip)
    }

    async fn exchange(&self, query: &[u8]) -> Result<Vec<u8>, FetchError> {
        let bind_addr: SocketAddr = if self.upstream.is_ipv6() {
            SocketAddr::from(([0u16; 8], 0))
        } else {
            SocketAddr::from(([0u8; 4], 0))
        };
        let socket = UdpSocket::bind(bind_addr).await.map_err(dns_io_error)?;
        socket.connect(self.upstream).await.map_err(dns_io_error)?;
        socket.send(query).await.map_err(dns_io_error)?;

        let mut buffer = vec![0u8; DNS_RESPONSE_BUFFER_SIZE];
        let received = socket.recv(&mut buffer).await.map_err(dns_io_error)?;
        buffer.truncate(received);
        Ok(buffer)
    }

    /// Races an A and an AAAA query for `domain`.
    ///
    /// The first family to succeed is returned without waiting for the other;
    /// the losing query keeps running in the background and its result is
    /// dropped. When both fail, the error names both causes.
    pub async fn resolve_host(&self, domain: &str) -> Result<IpAddr, FetchError> {
        let ipv4 = self.spawn_query(domain, RecordType::A);
        let ipv6 = self.spawn_query(domain, RecordType::Aaaa);
        first_success(ipv4, ipv6).await
    }

    /// Resolves the host of `target` and records the winning address.
    ///
    /// IPv4 literal hosts are already resolved and skip the network.
    pub async fn resolve(&self, target: &mut UrlComponents) -> Result<(), FetchError> {
        if target.is_resolved() {
            return Ok(());
        }
        let ip = self.resolve_host(&target.domain_name).await?;
        target.set_address(ip);
        Ok(())
    }

    fn spawn_query(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> oneshot::Receiver<Result<IpAddr, FetchError>> {
        let (tx, rx) = oneshot::channel();
        let resolver = *self;
        let domain = domain.to_string();
        tokio::spawn(async move {
            // The receiver is gone once the other family has won
            let _ = tx.send(resolver.query(&domain, record_type).await);
        });
        rx
    }
}

fn dns_io_error(e: std::io::Error) -> FetchError {
    FetchError::DnsTransport(e.to_string())
}

fn flatten(
    received: Result<Result<IpAddr, FetchError>, oneshot::error::RecvError>,
    record_type: RecordType,
) -> Result<IpAddr, FetchError> {
    received.unwrap_or_else(|_| {
        Err(FetchError::DnsTransport(format!(
            "{record_type} resolution task ended without a result"
        )))
    })
}

/// Waits for whichever family completes first.
///
/// A success returns immediately. An error is held until the sibling
/// completes; a later sibling success still wins.
async fn first_success(
    mut ipv4: oneshot::Receiver<Result<IpAddr, FetchError>>,
    mut ipv6: oneshot::Receiver<Result<IpAddr, FetchError>>,
) -> Result<IpAddr, FetchError> {
    let mut ipv4_err: Option<FetchError> = None;
    let mut ipv6_err: Option<FetchError> = None;

    loop {
        tokio::select! {
            received = &mut ipv4, if ipv4_err.is_none() => {
                match flatten(received, RecordType::A) {
                    Ok(ip) => return Ok(ip),
                    Err(e) => {
                        debug!("IPv4 resolution failed: {e}");
                        ipv4_err = Some(e);
                    }
                }
            }
            received = &mut ipv6, if ipv6_err.is_none() => {
                match flatten(received, RecordType::Aaaa) {
                    Ok(ip) => return Ok(ip),
                    Err(e) => {
                        debug!("IPv6 resolution failed: {e}");
                        ipv6_err = Some(e);
                    }
                }
            }
        }

        match (ipv4_err.take(), ipv6_err.take()) {
            (Some(ipv4), Some(ipv6)) => {
                return Err(FetchError::AddressResolution {
                    ipv4: Box::new(ipv4),
                    ipv6: Box::new(ipv6),
                })
            }
            (ipv4, ipv6) => {
                ipv4_err = ipv4;
                ipv6_err = ipv6;
            }
        }
    }
}
