//! Error types and result handling for Folio operations.
//!
//! This module defines the error handling system used throughout Folio.
//! All fallible operations return a [`Result<T>`] which is a type alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! Folio errors fall into three broad families:
//!
//! - **Network Errors**: Transport failures and non-2xx responses
//!   ([`Error::Network`], [`Error::Status`])
//! - **Parse Errors**: Malformed or unexpected response shapes
//!   ([`Error::Parse`], [`Error::Json`])
//! - **Empty Results**: The catalog answered but had no content to offer
//!   ([`Error::EmptyResult`])
//!
//! Local concerns (cache storage, configuration, IO) have their own variants.
//!
//! None of these are fatal. The search boundary turns every error into an empty
//! result list, and the reader boundary turns every error into a single
//! user-facing message.
//!
//! # Examples
//!
//! ```rust
//! use folio::Error;
//!
//! fn describe(error: &Error) -> &'static str {
//!     if error.is_network() {
//!         "network"
//!     } else if error.is_parse() {
//!         "parse"
//!     } else {
//!         "other"
//!     }
//! }
//!
//! assert_eq!(describe(&Error::parse("missing items")), "parse");
//! assert_eq!(describe(&Error::status(503, "https://books.test")), "network");
//! ```

use thiserror::Error;

/// Type alias for Results with Folio errors.
///
/// ```rust
/// use folio::{Error, Result};
///
/// fn example_operation() -> Result<String> {
///     Ok("Success".to_string())
/// }
///
/// fn example_with_error() -> Result<()> {
///     Err(Error::parse("Something went wrong"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all Folio operations.
///
/// # Variants
///
/// * [`Network`](Error::Network) - HTTP client and connection errors
/// * [`Status`](Error::Status) - Non-success HTTP status codes
/// * [`Parse`](Error::Parse) - Data parsing and format errors
/// * [`Json`](Error::Json) - JSON serialization errors
/// * [`EmptyResult`](Error::EmptyResult) - The catalog returned no usable content
/// * [`Cache`](Error::Cache) - Cache store failures
/// * [`Config`](Error::Config) - Invalid configuration files
/// * [`Io`](Error::Io) - File system and IO errors
#[derive(Error, Debug)]
pub enum Error {
    /// Network-related errors from HTTP operations.
    ///
    /// This variant wraps errors from the underlying HTTP client (reqwest),
    /// including DNS resolution failures, refused connections and TLS errors.
    /// The request URL is stripped on conversion.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The catalog answered with a non-success HTTP status.
    ///
    /// # Fields
    ///
    /// * `status` - The HTTP status code
    /// * `url` - The URL that was requested, with any API key redacted
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Response shape or data format errors.
    ///
    /// ```rust
    /// use folio::Error;
    ///
    /// let error = Error::parse("Volume response has no id");
    /// ```
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization and deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog responded successfully but offered nothing to show.
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Cache store read or write failures.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid configuration file contents.
    #[error("Config error: {0}")]
    Config(String),

    /// File system and IO operation errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a parse error with the given message.
    ///
    /// ```rust
    /// use folio::Error;
    ///
    /// let error = Error::parse(format!("Expected {} pages, found {}", 3, 2));
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates a status error for a non-success response.
    ///
    /// The `key` query parameter of `url` is redacted.
    ///
    /// ```rust
    /// use folio::Error;
    ///
    /// let error = Error::status(403, "https://books.test/v1/volumes/abc?key=hunter2");
    /// assert!(!error.to_string().contains("hunter2"));
    /// ```
    pub fn status(status: u16, url: impl AsRef<str>) -> Self {
        Error::Status {
            status,
            url: crate::net::redact_url(url.as_ref()),
        }
    }

    /// Creates an empty result error.
    pub fn empty(msg: impl Into<String>) -> Self {
        Error::EmptyResult(msg.into())
    }

    /// Creates a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Error::Cache(msg.into())
    }

    /// Returns `true` for transport failures and non-2xx responses.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Status { .. })
    }

    /// Returns `true` for malformed response shapes.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::Json(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.without_url())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
