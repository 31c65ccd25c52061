//! Blocking HTTP transport shared by the resolver and the fetcher.

use std::time::Duration;

use pakt_core::config::ResolverConfig;
use pakt_util::errors::PaktError;
use reqwest::blocking::{Client, Response};
use url::Url;

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// A blocking client that retries connection failures, timeouts and 5xx
/// responses.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retries: u32,
    retry_delay: Duration,
}

impl HttpClient {
    pub fn new(config: &ResolverConfig) -> miette::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("pakt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PaktError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            retries: config.retries.max(1),
            retry_delay: RETRY_DELAY,
        })
    }

    /// Base delay between attempts; attempt `n` waits `n * delay`.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// GET `url`, returning the first response that is not a server error.
    ///
    /// Client errors are returned to the caller untouched.
    pub fn get(&self, url: &Url) -> miette::Result<Response> {
        let mut last_err = String::new();

        for attempt in 0..self.retries {
            if attempt > 0 {
                std::thread::sleep(self.retry_delay * attempt);
            }

            match self.client.get(url.clone()).send() {
                Ok(resp) if resp.status().is_server_error() => {
                    last_err = format!("HTTP {} from {url}", resp.status());
                    tracing::debug!("{last_err}, attempt {} of {}", attempt + 1, self.retries);
                }
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last_err = e.to_string();
                    tracing::debug!("request to {url} failed: {e}, attempt {} of {}", attempt + 1, self.retries);
                }
                Err(e) => {
                    return Err(PaktError::Network {
                        message: format!("Request to {url} failed: {e}"),
                    }
                    .into());
                }
            }
        }

        Err(PaktError::Network {
            message: format!("Failed after {} retries for {url}: {last_err}", self.retries),
        }
        .into())
    }

    /// GET `url` and return the body, treating any status of 400 or above as an error.
    pub fn get_text(&self, url: &Url) -> miette::Result<String> {
        let resp = self.get(url)?;
        let status = resp.status();
        if status.as_u16() >= 400 {
            return Err(PaktError::Network {
                message: format!("unexpected {status} response code from {url}"),
            }
            .into());
        }
        resp.text().map_err(|e| {
            PaktError::Network {
                message: format!("Failed to read response from {url}: {e}"),
            }
            .into()
        })
    }
}
