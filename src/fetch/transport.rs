//! Connection handling for a single request.
//!
//! Every request opens a fresh connection (`Connection: close`), writes the
//! serialized request and reads until the peer closes.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::error_handling::FetchError;
use crate::http::{HttpRequest, HttpResponse};
use crate::tls::handshake;
use crate::url::UrlComponents;

/// Sends requests over plain TCP or TLS with a fixed deadline.
#[derive(Clone)]
pub(crate) struct Transport {
    tls: TlsConnector,
    timeout: Duration,
}

impl Transport {
    pub(crate) fn new(tls: TlsConnector, timeout: Duration) -> Self {
        Self { tls, timeout }
    }

    /// Sends `request` to each resolved address of `target` in turn, IPv6
    /// first, and returns the first response together with the address that
    /// produced it.
    ///
    /// Any failure on one family (connect, write, read or parse) moves on to
    /// the next one. When every address fails the last error is returned.
    pub(crate) async fn send_with_fallback(
        &self,
        target: &UrlComponents,
        request: &HttpRequest,
    ) -> Result<(HttpResponse, IpAddr), FetchError> {
        let mut last_error = None;
        for ip in target.addresses() {
            match self.send(target, ip, request).await {
                Ok(response) => return Ok((response, ip)),
                Err(e) => {
                    warn!(
                        "Failed to get HTTP response from the {} address {}: {}",
                        family(ip),
                        ip,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| FetchError::NoAddress(target.domain_name.clone())))
    }

    /// Sends `request` to one address.
    ///
    /// For `https` the TCP connection still goes to `ip`; the domain name is
    /// only used for SNI and certificate validation.
    pub(crate) async fn send(
        &self,
        target: &UrlComponents,
        ip: IpAddr,
        request: &HttpRequest,
    ) -> Result<HttpResponse, FetchError> {
        let addr = SocketAddr::new(ip, target.port);
        let sock = match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(sock)) => sock,
            Ok(Err(e)) => {
                return Err(FetchError::HttpTransport(format!(
                    "connect to {addr} failed: {e}"
                )))
            }
            Err(_) => {
                return Err(FetchError::HttpTransport(format!(
                    "connect to {} timed out after {}s",
                    addr,
                    self.timeout.as_secs()
                )))
            }
        };

        let raw = if target.protocol.is_tls() {
            let stream = handshake(&self.tls, &target.domain_name, sock, self.timeout).await?;
            self.exchange(stream, request).await?
        } else {
            self.exchange(sock, request).await?
        };

        let response = HttpResponse::parse(&raw, request.method)?;
        info!("Got HTTP response from {}: {}", addr, response.status_line);
        Ok(response)
    }

    /// Writes the request and reads the whole response under one deadline.
    async fn exchange<S>(&self, mut stream: S, request: &HttpRequest) -> Result<Vec<u8>, FetchError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        debug!("HTTP request:\n{request}");
        let io = async {
            stream.write_all(&request.to_bytes()).await?;
            stream.flush().await?;
            read_until_close(&mut stream).await
        };
        match tokio::time::timeout(self.timeout, io).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => Err(FetchError::HttpTransport(e.to_string())),
            Err(_) => Err(FetchError::HttpTransport(format!(
                "no complete response within {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

async fn read_until_close<S: AsyncRead + Unpin>(stream: &mut S) -> io::Result<Vec<u8>> {
    let mut raw = Vec::new();
    match stream.read_to_end(&mut raw).await {
        Ok(_) => Ok(raw),
        // TLS peers often close without close_notify
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && !raw.is_empty() => Ok(raw),
        Err(e) => Err(e),
    }
}

fn family(ip: IpAddr) -> &'static str {
    match ip {
        IpAddr::V4(_) => "IPv4",
        IpAddr::V6(_) => "IPv6",
    }
}
