//! Main application entry point (CLI binary).
//!
//! Parses the command line, sets up logging and TLS, then fetches one URL and
//! writes its body to stdout. Diagnostics go to stderr. A failed fetch is
//! reported but still exits with status 0.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use log::error;

use wireget::initialization::init_logger_with;
use wireget::{parse_url, Config, FetchError, Fetcher};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let fetcher = Fetcher::new(&config).context("Failed to initialize TLS client")?;

    let mut target = match parse_url(&config.url) {
        Ok(target) => target,
        Err(e @ FetchError::UnsupportedProtocol(_)) => {
            return report("Protocol not implemented", &e)
        }
        Err(e) => return report("Cannot parse URL", &e),
    };

    if let Err(e) = fetcher.resolve(&mut target).await {
        return report("Failed to resolve DNS", &e);
    }

    let fetched = match fetcher.download(target).await {
        Ok(fetched) => fetched,
        Err(e) => return report("Failed to get HTTP response", &e),
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&fetched.response.body)
        .and_then(|()| stdout.flush())
        .context("Failed to write response body")?;
    Ok(())
}

fn report(message: &str, e: &FetchError) -> Result<()> {
    error!("{message}: {e}");
    log::debug!("Error kind: {}", e.kind());
    Ok(())
}
