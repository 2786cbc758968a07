// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Favicon retrieval.
//!
//! The match engine never talks to the network directly. It consumes the
//! [`FaviconFetcher`] capability, so tests run the whole pipeline against an
//! in-memory fetcher, and alternative transports (proxied, cached, offline)
//! slot in without touching the engine.

use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::debug;

use crate::errors::{FetchError, FetchErrorKind};
use crate::http_client::{HttpClient, HttpResponse};

/// Capability for retrieving the favicon bytes of one target.
///
/// On success the returned bytes are the exact favicon resource content; on
/// failure the error carries a classified [`FetchErrorKind`]. Retry policy,
/// if any, belongs behind this interface - callers get one answer per call.
#[async_trait]
pub trait FaviconFetcher: Send + Sync {
    async fn fetch(&self, target: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP fetcher: scrapes the target page for `<link rel="icon">` tags and
/// falls back to `/favicon.ico` at the site root.
pub struct HttpFaviconFetcher {
    client: HttpClient,
    timeout: Duration,
}

impl HttpFaviconFetcher {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Resolve and download the favicon, bounded by the per-target timeout.
    async fn fetch_inner(&self, target: &str) -> Result<Vec<u8>, FetchError> {
        let base_url = normalize_target(target);

        let mut candidates = Vec::new();

        // Scrape the landing page for a declared icon. A failure here is not
        // fatal: plenty of hosts serve /favicon.ico with no link tag.
        match self.client.get(&base_url).await {
            Ok(response) if response.status_code < 400 => {
                let html = String::from_utf8_lossy(&response.body);
                if let Some(href) = extract_favicon_from_html(&html, &base_url) {
                    debug!("Scraped favicon link for {}: {}", target, href);
                    candidates.push(href);
                }
            }
            Ok(response) => {
                debug!(
                    "Landing page for {} returned {}, falling back to /favicon.ico",
                    target, response.status_code
                );
            }
            // A dead host fails fast instead of probing icon paths that
            // cannot succeed either.
            Err(err)
                if matches!(
                    err.kind,
                    FetchErrorKind::ConnectionError | FetchErrorKind::Timeout
                ) =>
            {
                return Err(err)
            }
            Err(err) => {
                debug!("Landing page fetch failed for {}: {}, trying /favicon.ico", target, err);
            }
        }

        if let Some(fallback) = fallback_favicon_url(&base_url) {
            if !candidates.contains(&fallback) {
                candidates.push(fallback);
            }
        }

        let mut last_status = None;
        for url in &candidates {
            match self.client.get(url).await {
                Ok(response) if is_favicon_response(&response, url) => {
                    debug!("Fetched favicon for {} from {} ({} bytes)", target, url, response.body.len());
                    return Ok(response.body);
                }
                Ok(response) => {
                    debug!("Rejected favicon candidate {} ({})", url, response.status_code);
                    last_status = Some(response.status_code);
                }
                Err(err) => return Err(err),
            }
        }

        Err(FetchError::not_found(match last_status {
            Some(status) => format!("no favicon at {target} (last candidate returned {status})"),
            None => format!("no favicon candidates for {target}"),
        }))
    }
}

#[async_trait]
impl FaviconFetcher for HttpFaviconFetcher {
    async fn fetch(&self, target: &str) -> Result<Vec<u8>, FetchError> {
        match tokio::time::timeout(self.timeout, self.fetch_inner(target)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::timeout(format!(
                "target {target} exceeded the {:?} budget",
                self.timeout
            ))),
        }
    }
}

/// Targets may arrive as bare hosts; default to https like a browser would.
fn normalize_target(target: &str) -> String {
    if target.contains("://") {
        target.to_string()
    } else {
        format!("https://{target}")
    }
}

/// Extract favicon URL from HTML link tags
fn extract_favicon_from_html(html: &str, base_url: &str) -> Option<String> {
    // Look for <link rel="icon" or <link rel="shortcut icon"
    let re =
        Regex::new(r#"<link[^>]*rel=["'](?:shortcut )?icon["'][^>]*href=["']([^"']+)["']"#).ok()?;

    if let Some(cap) = re.captures(html) {
        if let Some(href) = cap.get(1) {
            return resolve_url(href.as_str(), base_url);
        }
    }

    // Try alternate format: href before rel
    let re2 =
        Regex::new(r#"<link[^>]*href=["']([^"']+)["'][^>]*rel=["'](?:shortcut )?icon["']"#).ok()?;

    if let Some(cap) = re2.captures(html) {
        if let Some(href) = cap.get(1) {
            return resolve_url(href.as_str(), base_url);
        }
    }

    None
}

fn resolve_url(src: &str, base_url: &str) -> Option<String> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }

    let base = url::Url::parse(base_url).ok()?;

    if src.starts_with("//") {
        return Some(format!("{}:{}", base.scheme(), src));
    }

    base.join(src).ok().map(|u| u.to_string())
}

/// Build the `/favicon.ico` fallback from the target's origin.
fn fallback_favicon_url(base_url: &str) -> Option<String> {
    let parsed = url::Url::parse(base_url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{}:{}/favicon.ico", parsed.scheme(), host, port),
        None => format!("{}://{}/favicon.ico", parsed.scheme(), host),
    })
}

/// A usable favicon response: success status, non-empty body, and either an
/// image-ish content type or an icon file extension.
fn is_favicon_response(response: &HttpResponse, url: &str) -> bool {
    if response.status_code != 200 || response.body.is_empty() {
        return false;
    }

    let content_type = response
        .header("content-type")
        .map(str::to_lowercase)
        .unwrap_or_default();

    content_type.contains("image")
        || content_type.contains("icon")
        || content_type.contains("octet-stream")
        || url.ends_with(".ico")
        || url.ends_with(".png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favicon_html_extraction() {
        let html = r#"
            <html>
            <head>
                <link rel="shortcut icon" href="/static/favicon.ico">
            </head>
            </html>
        "#;

        let favicon = extract_favicon_from_html(html, "https://example.com");
        assert_eq!(
            favicon.as_deref(),
            Some("https://example.com/static/favicon.ico")
        );
    }

    #[test]
    fn test_favicon_html_extraction_href_before_rel() {
        let html = r#"<link href="/fav.png" rel="icon" type="image/png">"#;
        let favicon = extract_favicon_from_html(html, "https://example.com");
        assert_eq!(favicon.as_deref(), Some("https://example.com/fav.png"));
    }

    #[test]
    fn test_favicon_html_extraction_absent() {
        assert!(extract_favicon_from_html("<html><body>no icons</body></html>", "https://example.com").is_none());
    }

    #[test]
    fn test_resolve_url_variants() {
        assert_eq!(
            resolve_url("https://cdn.example.com/i.ico", "https://example.com"),
            Some("https://cdn.example.com/i.ico".to_string())
        );
        assert_eq!(
            resolve_url("//cdn.example.com/i.ico", "https://example.com"),
            Some("https://cdn.example.com/i.ico".to_string())
        );
        assert_eq!(
            resolve_url("/img/favicon.png", "https://example.com/page"),
            Some("https://example.com/img/favicon.png".to_string())
        );
    }

    #[test]
    fn test_fallback_favicon_url() {
        assert_eq!(
            fallback_favicon_url("https://example.com/some/page").as_deref(),
            Some("https://example.com/favicon.ico")
        );
        assert_eq!(
            fallback_favicon_url("https://example.com:8443/x").as_deref(),
            Some("https://example.com:8443/favicon.ico")
        );
    }

    #[test]
    fn test_normalize_target() {
        assert_eq!(normalize_target("example.com"), "https://example.com");
        assert_eq!(
            normalize_target("http://example.com"),
            "http://example.com"
        );
    }
}
