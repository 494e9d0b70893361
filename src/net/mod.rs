//! Network utilities for HTTP requests and HTML handling.
//!
//! This module provides the networking infrastructure for Folio:
//!
//! - **Transport**: The [`Transport`] trait, the single seam through which catalogs
//!   perform HTTP GET requests
//! - **HTTP Client**: [`HttpClient`], a reqwest-backed transport sharing one global,
//!   pooled client
//! - **HTML**: Sanitizing and text rendering in [`html`]
//!
//! There is no retry or rate limiting here: a failed request fails the
//! operation that issued it.
//!
//! # Examples
//!
//! ```rust
//! use folio::net::{HttpClient, Transport};
//!
//! # async fn example() -> folio::Result<()> {
//! let client = HttpClient::new("google-books")
//!     .with_header("Accept-Language", "en");
//!
//! let text = client.get_text("https://example.com").await?;
//! let body = client.get("https://www.googleapis.com/books/v1/volumes?q=dune").await?;
//! let json: serde_json::Value = serde_json::from_slice(&body)?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::{Client, header::HeaderMap};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub mod html;

/// Global HTTP client instance.
///
/// This client is configured with:
/// - Connection pooling (10 idle connections per host)
/// - Compression support (gzip, brotli)
/// - A default User-Agent header
///
/// No request timeout is set; a slow catalog only delays the operation
/// waiting on it.
static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("Folio/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        .brotli(true)
        .build()
        .expect("Failed to build HTTP client")
});

/// Performs HTTP GET requests on behalf of a catalog.
///
/// Implementations return the response body for 2xx responses and an error
/// otherwise. Tests substitute a scripted implementation to count requests.
///
/// # Errors
///
/// * [`Error::Status`](crate::Error::Status) - For non-success HTTP statuses
/// * [`Error::Network`](crate::Error::Network) - For connection failures
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns the raw body.
    async fn get(&self, url: &str) -> crate::Result<Bytes>;

    /// Fetches `url` and returns the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// * All errors from [`get()`](Transport::get)
    /// * [`Error::Parse`](crate::Error::Parse) - If the body is not valid UTF-8
    async fn get_text(&self, url: &str) -> crate::Result<String> {
        let bytes = self.get(url).await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| crate::Error::parse(format!("Invalid UTF-8: {}", e)))
    }
}

/// HTTP client wrapper bound to one catalog.
///
/// `HttpClient` provides a small interface for GET requests with per-catalog
/// default headers. The underlying connection pool is shared by all instances.
///
/// # Examples
///
/// ```rust
/// use folio::net::{HttpClient, Transport};
///
/// # async fn example() -> folio::Result<()> {
/// let client = HttpClient::new("google-books");
/// let body = client.get_text("https://www.googleapis.com/books/v1/volumes?q=dune").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    catalog_id: String,
    headers: HeaderMap,
}

impl HttpClient {
    /// Creates a new HTTP client for the specified catalog.
    ///
    /// # Parameters
    ///
    /// * `catalog_id` - Identifier for the catalog, used in log output
    pub fn new(catalog_id: impl Into<String>) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Adds a custom header to all requests made by this client.
    ///
    /// Invalid header names or values are ignored.
    ///
    /// ```rust
    /// use folio::net::HttpClient;
    ///
    /// let client = HttpClient::new("catalog")
    ///     .with_header("User-Agent", "MyReader/1.0")
    ///     .with_header("Accept-Language", "en");
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Performs a GET request.
    ///
    /// # Returns
    ///
    /// The response body as `Bytes` on success.
    ///
    /// # Errors
    ///
    /// * [`Error::Status`](crate::Error::Status) - For HTTP errors (4xx, 5xx)
    /// * [`Error::Network`](crate::Error::Network) - For network/connection errors
    pub async fn get(&self, url: &str) -> crate::Result<Bytes> {
        debug!(catalog = %self.catalog_id, url = %redact_url(url), "GET");

        let response = CLIENT.get(url).headers(self.headers.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(crate::Error::status(status.as_u16(), url));
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str) -> crate::Result<Bytes> {
        HttpClient::get(self, url).await
    }
}

/// Query parameter carrying the catalog API key.
const KEY_PARAM: &str = "key";

/// Returns `url` with the value of its `key` query parameter replaced by
/// `REDACTED`, for use in errors and log lines.
///
/// Strings that do not parse as URLs are returned unchanged.
///
/// ```rust
/// use folio::net::redact_url;
///
/// assert_eq!(
///     redact_url("https://books.test/v1/volumes?q=dune&key=hunter2"),
///     "https://books.test/v1/volumes?q=dune&key=REDACTED"
/// );
/// ```
pub fn redact_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if !parsed.query_pairs().any(|(name, _)| name == KEY_PARAM) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == KEY_PARAM {
                "REDACTED".to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}
