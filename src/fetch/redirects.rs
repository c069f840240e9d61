//! HTTP redirect chain following.
//!
//! Only 301 and 302 are followed. The cookie aggregated from each hop's
//! `Set-Cookie` headers is sent with the next request.

use log::info;

use crate::error_handling::FetchError;
use crate::fetch::{Fetched, Fetcher};
use crate::http::{HttpRequest, Method};
use crate::url::UrlComponents;

impl Fetcher {
    /// Sends a `method` request to `target`, following redirects up to the
    /// configured hop limit.
    ///
    /// A hop to a different domain resolves that domain afresh. A hop on the
    /// same domain reuses the address that answered the previous hop.
    ///
    /// # Errors
    ///
    /// - `MalformedHeader` for a 301/302 without `Location`
    /// - `TooManyRedirects` when the hop limit is exceeded
    /// - any transport, DNS or parse error from an individual hop
    pub(crate) async fn follow_redirects(
        &self,
        mut target: UrlComponents,
        method: Method,
    ) -> Result<Fetched, FetchError> {
        let mut cookie = String::new();

        for _ in 0..=self.max_redirects {
            let request = HttpRequest::new(method, &target).with_cookie(&cookie);
            let (response, used_ip) = self.transport.send_with_fallback(&target, &request).await?;
            if !response.is_redirect() {
                return Ok(Fetched {
                    url: target,
                    response,
                });
            }

            let location = response.location().ok_or_else(|| {
                FetchError::MalformedHeader(format!(
                    "{} without a Location header",
                    response.status_line
                ))
            })?;
            let mut next = target.join(location)?;
            if next.domain_name != target.domain_name {
                self.resolver.resolve(&mut next).await?;
                if let Some(ipv4) = next.ipv4 {
                    info!("Resolved redirecting IPv4 address: {ipv4}");
                }
                if let Some(ipv6) = next.ipv6 {
                    info!("Resolved redirecting IPv6 address: {ipv6}");
                }
            } else {
                next.set_address(used_ip);
            }

            info!("Following {} redirect to {}", response.status_code, next);
            cookie = response.cookie;
            target = next;
        }

        Err(FetchError::TooManyRedirects(self.max_redirects))
    }
}
