//! Sources of the anti-forgery token the host requires on every API call.

use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use reqwest::{header, Url};

/// Name of the page meta tag and of the request header carrying the token.
pub const CSRF_TOKEN_NAME: &str = "x-csrf-token";

/// Supplies a fresh anti-forgery token for each request.
///
/// `None` means no token is available; the client then fails the call without
/// sending anything.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Option<String>;
}

/// A token configured up front (or deliberately absent).
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.trim().is_empty()))
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Reads the token from the host page's `<meta name="x-csrf-token">` tag,
/// fetching the page on every call.
#[derive(Debug, Clone)]
pub struct PageToken {
    client: reqwest::Client,
    page_url: Url,
    cookie: Option<String>,
    meta_tag: Regex,
    name_attr: Regex,
    content_attr: Regex,
}

impl PageToken {
    pub fn new(client: reqwest::Client, page_url: Url, cookie: Option<String>) -> Self {
        Self {
            client,
            page_url,
            cookie,
            meta_tag: Regex::new(r"(?is)<meta\b[^>]*>").expect("static regex"),
            name_attr: Regex::new(r#"(?i)\bname\s*=\s*["']([^"']*)["']"#).expect("static regex"),
            content_attr: Regex::new(r#"(?i)\bcontent\s*=\s*["']([^"']*)["']"#)
                .expect("static regex"),
        }
    }

    /// Finds the token in an HTML document. Attribute order does not matter.
    pub fn extract(&self, html: &str) -> Option<String> {
        self.meta_tag
            .find_iter(html)
            .map(|m| m.as_str())
            .find(|tag| {
                self.name_attr
                    .captures(tag)
                    .is_some_and(|c| c[1].eq_ignore_ascii_case(CSRF_TOKEN_NAME))
            })
            .and_then(|tag| self.content_attr.captures(tag))
            .map(|c| c[1].to_string())
            .filter(|t| !t.is_empty())
    }

    async fn fetch_page(&self) -> reqwest::Result<String> {
        let mut request = self.client.get(self.page_url.clone());
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        request.send().await?.error_for_status()?.text().await
    }
}

#[async_trait]
impl TokenSource for PageToken {
    async fn token(&self) -> Option<String> {
        match self.fetch_page().await {
            Ok(html) => {
                let token = self.extract(&html);
                if token.is_none() {
                    debug!("No {CSRF_TOKEN_NAME} meta tag on {}", self.page_url);
                }
                token
            }
            Err(e) => {
                warn!("Failed to load {} for token: {e}", self.page_url);
                None
            }
        }
    }
}
