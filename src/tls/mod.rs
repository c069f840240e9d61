//! TLS client setup.
//!
//! Uses `tokio-rustls` over an already connected TCP stream. The server name
//! sent for SNI and checked against the certificate is the URL's domain, while
//! the TCP connection goes to the address resolved by our own DNS resolver.
//! Trust anchors come from `webpki-roots`.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use rustls::crypto::ring::default_provider;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::error_handling::{FetchError, InitializationError};

/// Builds a connector trusting the webpki root store.
///
/// # Errors
///
/// Returns `InitializationError::TlsError` if the crypto provider rejects the
/// default protocol versions.
pub fn build_tls_connector() -> Result<TlsConnector, InitializationError> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Performs the TLS handshake for `domain` over `sock`.
///
/// # Errors
///
/// Returns `FetchError::HttpTransport` if the domain is not a valid server
/// name, the handshake fails, or it does not finish within `timeout`.
pub async fn handshake(
    connector: &TlsConnector,
    domain: &str,
    sock: TcpStream,
    timeout: Duration,
) -> Result<TlsStream<TcpStream>, FetchError> {
    let server_name = ServerName::try_from(domain.to_string())
        .map_err(|e| FetchError::HttpTransport(format!("invalid server name {domain}: {e}")))?;

    let stream = match tokio::time::timeout(timeout, connector.connect(server_name, sock)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            return Err(FetchError::HttpTransport(format!(
                "TLS handshake failed for {domain}: {e}"
            )))
        }
        Err(_) => {
            return Err(FetchError::HttpTransport(format!(
                "TLS handshake timeout for {} ({}s)",
                domain,
                timeout.as_secs()
            )))
        }
    };

    debug!(
        "TLS established with {domain}: {:?}",
        stream.get_ref().1.protocol_version()
    );
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tls_connector() {
        assert!(build_tls_connector().is_ok());
    }

    #[test]
    fn test_connector_does_not_need_process_default_provider() {
        let connector = build_tls_connector().unwrap();
        assert!(rustls::crypto::CryptoProvider::get_default().is_none());
        drop(connector);
    }

    #[tokio::test]
    async fn test_handshake_rejects_invalid_server_name() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let sock = TcpStream::connect(addr).await.unwrap();
        let connector = build_tls_connector().unwrap();

        let result = handshake(&connector, "bad name!", sock, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(FetchError::HttpTransport(_))));
    }

    #[tokio::test]
    async fn test_handshake_times_out_against_silent_peer() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let sock = TcpStream::connect(addr).await.unwrap();
        // Keep the accepted socket open without answering
        let (_peer, _) = listener.accept().await.unwrap();
        let connector = build_tls_connector().unwrap();

        let result = handshake(&connector, "example.com", sock, Duration::from_millis(200)).await;
        match result {
            Err(FetchError::HttpTransport(message)) => assert!(message.contains("timeout")),
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }
}
