// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::errors::{FetchError, FetchErrorKind, ScannerError};

/// Realistic browser User-Agents to avoid detection
const BROWSER_USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Chrome on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    // Safari on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Get a realistic browser User-Agent (rotates to avoid blocks)
fn get_browser_user_agent() -> &'static str {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let index = COUNTER.fetch_add(1, Ordering::Relaxed) % BROWSER_USER_AGENTS.len();
    BROWSER_USER_AGENTS[index]
}

/// Maximum response body size (5MB). A favicon larger than this is not a
/// favicon. Oversized bodies are rejected outright: truncating would hash
/// partial content and produce a fingerprint that matches nothing.
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Connection pool settings
const POOL_IDLE_PER_HOST: usize = 16;
const POOL_MAX_IDLE_TIMEOUT: u64 = 90;

pub struct HttpResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    max_retries: u32,
    max_body_size: usize,
}

impl HttpClient {
    pub fn new(
        timeout_secs: u64,
        max_retries: u32,
        user_agent: Option<&str>,
        accept_invalid_certs: bool,
    ) -> Result<Self, ScannerError> {
        let user_agent = user_agent.unwrap_or_else(|| get_browser_user_agent());

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .pool_max_idle_per_host(POOL_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(POOL_MAX_IDLE_TIMEOUT))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ScannerError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client: Arc::new(client),
            max_retries,
            max_body_size: MAX_BODY_SIZE,
        })
    }

    /// Send a GET request, retrying retryable transport faults with a linear
    /// backoff. HTTP status codes are returned to the caller unchanged; only
    /// transport errors are retried here.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let mut attempts = 0;

        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status_code = response.status().as_u16();

                    let headers_map = {
                        let headers = response.headers();
                        let mut map = HashMap::with_capacity(headers.len());
                        for (k, v) in headers.iter() {
                            if let Ok(value_str) = v.to_str() {
                                map.insert(k.as_str().to_string(), value_str.to_string());
                            }
                        }
                        map
                    };

                    let body = response.bytes().await.map_err(FetchError::from)?;
                    if body.len() > self.max_body_size {
                        return Err(FetchError::new(
                            FetchErrorKind::Other,
                            format!(
                                "response body from {} is {} bytes, over the {} byte cap",
                                url,
                                body.len(),
                                self.max_body_size
                            ),
                        ));
                    }

                    return Ok(HttpResponse {
                        status_code,
                        headers: headers_map,
                        body: body.to_vec(),
                    });
                }
                Err(e) => {
                    let err = FetchError::from(e);
                    if !err.is_retryable() || attempts >= self.max_retries {
                        return Err(err);
                    }
                    attempts += 1;
                    debug!(
                        "Retrying {} after transport error (attempt {}): {}",
                        url, attempts, err
                    );
                    tokio::time::sleep(Duration::from_millis(100 * attempts as u64)).await;
                }
            }
        }
    }
}
