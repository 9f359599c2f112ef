use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};

use crate::error::{Result, ScrapeError};

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches a URL and returns the body as text.
///
/// `timeout` of `None` waits indefinitely. Implementations report timeouts as
/// [`ScrapeError::Timeout`] and every other failure, including non-2xx
/// statuses, as [`ScrapeError::Request`].
pub trait PageClient {
    fn get_text(&self, url: &str, timeout: Option<Duration>) -> Result<String>;
}

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7"));

        let client = Client::builder()
            .timeout(None::<Duration>)
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpClient { client })
    }
}

impl PageClient for HttpClient {
    fn get_text(&self, url: &str, timeout: Option<Duration>) -> Result<String> {
        debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                ScrapeError::Timeout { url: url.to_string() }
            } else {
                ScrapeError::Request { url: url.to_string(), reason: e.to_string() }
            }
        };

        let resp = request.send().map_err(classify)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Request {
                url: url.to_string(),
                reason: format!("HTTP status {}", status),
            });
        }
        resp.text().map_err(classify)
    }
}
