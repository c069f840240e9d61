//! Fetching a URL end to end.
//!
//! A fetch parses the URL, races A/AAAA resolution, probes the resource with
//! `HEAD` and then either downloads it in parallel byte ranges or issues a
//! single `GET`. Both the probe and the `GET` follow redirects.

mod ranged;
mod redirects;
mod transport;


use log::{info, warn};

use crate::config::Config;
use crate::dns::Resolver;
use crate::error_handling::{FetchError, InitializationError};
use crate::http::{HttpResponse, Method};
use crate::tls::build_tls_connector;
use crate::url::{parse_url, UrlComponents};

pub use ranged::{plan_segments, ranged_length, Segment};
use transport::Transport;

/// The outcome of a fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// The URL that produced the final response, after redirects.
    pub url: UrlComponents,
    pub response: HttpResponse,
}

/// Fetches URLs using the resolver and timeouts from a [`Config`].
///
/// Cloning is cheap; the TLS configuration is shared.
#[derive(Clone)]
pub struct Fetcher {
    resolver: Resolver,
    transport: Transport,
    range_threshold: u64,
    max_redirects: usize,
}

impl Fetcher {
    /// Builds a fetcher.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::TlsError` if the TLS client cannot be
    /// configured.
    pub fn new(config: &Config) -> Result<Self, InitializationError> {
        Ok(Self {
            resolver: Resolver::from_config(config),
            transport: Transport::new(build_tls_connector()?, config.http_timeout()),
            range_threshold: config.range_threshold,
            max_redirects: config.max_redirects,
        })
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolves `target`'s host unless it is already resolved.
    pub async fn resolve(&self, target: &mut UrlComponents) -> Result<(), FetchError> {
        self.resolver.resolve(target).await
    }

    /// Parses, resolves and downloads `raw_url`.
    pub async fn fetch(&self, raw_url: &str) -> Result<Fetched, FetchError> {
        let mut target = parse_url(raw_url)?;
        self.resolve(&mut target).await?;
        self.download(target).await
    }

    /// Downloads an already resolved `target`.
    ///
    /// Large resources that advertise range support are fetched in parallel
    /// segments. If the probe fails or the ranged download fails, the resource
    /// is fetched again with one plain `GET`.
    pub async fn download(&self, target: UrlComponents) -> Result<Fetched, FetchError> {
        match self.follow_redirects(target.clone(), Method::Head).await {
            Ok(probe) => {
                if let Some(length) = ranged_length(&probe.response, self.range_threshold) {
                    let assembled =
                        ranged::download(&self.transport, &probe.url, &probe.response.cookie, length)
                            .await;
                    match assembled {
                        Ok(body) => {
                            let mut response = probe.response;
                            response.body = body;
                            return Ok(Fetched {
                                url: probe.url,
                                response,
                            });
                        }
                        Err(e) => warn!("Ranged download abandoned, falling back to GET: {e}"),
                    }
                }
            }
            Err(e) => warn!("HEAD request for {target} failed: {e}"),
        }

        let fetched = self.follow_redirects(target, Method::Get).await?;
        info!(
            "Fetched {} bytes from {}",
            fetched.response.body.len(),
            fetched.url
        );
        Ok(fetched)
    }
}
