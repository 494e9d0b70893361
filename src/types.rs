//! Core data types for books, book content, and search parameters.
//!
//! This module defines the fundamental data structures used throughout Folio:
//!
//! - [`Book`] - A search result as normalized from the catalog
//! - [`BookDetails`] - Single-book metadata used to plan content retrieval
//! - [`BookContent`] - The page sequence shown in the reader
//! - [`Viewability`] - How much of a book the catalog lets us read
//! - [`SearchParams`] - Parameters for searching the catalog
//! - [`SortOrder`] - Sorting options for search results
//!
//! # Examples
//!
//! ```rust
//! use folio::types::*;
//!
//! let book = Book {
//!     id: "abc123".to_string(),
//!     title: "Dune".to_string(),
//!     authors: Some(vec!["Frank Herbert".to_string()]),
//!     description: None,
//!     thumbnail_url: None,
//!     preview_url: None,
//!     fully_viewable: false,
//! };
//! assert_eq!(book.authors_line(), "Frank Herbert");
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest number of results a single search may return.
pub const MAX_RESULTS: usize = 21;

/// Represents a book as returned by a catalog search.
///
/// Optional fields mirror what the remote catalog may leave out. A `Book` is
/// immutable once it has been built from a catalog response.
///
/// # Fields
///
/// * `id` - Catalog-assigned unique identifier
/// * `title` - The main title
/// * `authors` - Ordered author names, when the catalog lists any
/// * `description` - Optional summary, may contain HTML
/// * `thumbnail_url` - Optional cover thumbnail URL
/// * `preview_url` - Optional link to the catalog's own preview page
/// * `fully_viewable` - Whether every page can be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Catalog-assigned unique identifier
    pub id: String,

    /// Main title
    pub title: String,

    /// List of authors
    #[serde(default)]
    pub authors: Option<Vec<String>>,

    /// Description/summary
    #[serde(default)]
    pub description: Option<String>,

    /// Cover thumbnail URL
    #[serde(default)]
    pub thumbnail_url: Option<String>,

    /// Catalog preview link
    #[serde(default)]
    pub preview_url: Option<String>,

    /// Whether the catalog exposes all pages
    #[serde(default)]
    pub fully_viewable: bool,
}

impl Book {
    /// Authors joined for display, or an empty string when unknown.
    pub fn authors_line(&self) -> String {
        self.authors
            .as_ref()
            .map(|authors| authors.join(", "))
            .unwrap_or_default()
    }
}

/// How much of a book the catalog allows to be read.
///
/// Parsed from the catalog's `accessInfo.viewability` string. Unrecognized
/// values are preserved in [`Viewability::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Viewability {
    AllPages,
    Partial,
    #[default]
    NoPages,
    Unknown(String),
}

impl Viewability {
    /// Parses a remote viewability flag.
    ///
    /// ```rust
    /// use folio::types::Viewability;
    ///
    /// assert_eq!(Viewability::parse("ALL_PAGES"), Viewability::AllPages);
    /// assert_eq!(Viewability::parse("PARTIAL"), Viewability::Partial);
    /// assert!(!Viewability::parse("SAMPLE").is_full());
    /// ```
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ALL_PAGES" => Viewability::AllPages,
            "PARTIAL" => Viewability::Partial,
            "NO_PAGES" => Viewability::NoPages,
            other => Viewability::Unknown(other.to_string()),
        }
    }

    /// Returns `true` when every page is available.
    pub fn is_full(&self) -> bool {
        matches!(self, Viewability::AllPages)
    }
}

/// Metadata of a single book, fetched by id.
///
/// Used when planning full-content retrieval: `page_count` decides how many
/// page requests are issued.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookDetails {
    pub id: String,
    pub description: Option<String>,
    pub page_count: Option<u32>,
}

/// The page sequence shown in the reader.
///
/// Pages are raw HTML fragments as delivered by the catalog; they must go
/// through [`sanitize`](crate::net::html::sanitize) before display. The
/// serialized form uses the field names `pages` and `currentPage`.
///
/// `pages` is never empty and `current_page` always indexes into it.
///
/// # Examples
///
/// ```rust
/// use folio::types::BookContent;
///
/// let mut content = BookContent::new(vec!["<p>one</p>".into(), "<p>two</p>".into()]).unwrap();
/// assert_eq!(content.current_page(), 0);
/// assert!(content.next_page());
/// assert_eq!(content.current(), "<p>two</p>");
/// assert!(!content.next_page());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookContent {
    pages: Vec<String>,
    current_page: usize,
}

impl BookContent {
    /// Creates content positioned on the first page.
    ///
    /// # Errors
    ///
    /// * [`Error::EmptyResult`] - If `pages` is empty
    pub fn new(pages: Vec<String>) -> Result<Self> {
        if pages.is_empty() {
            return Err(Error::empty("Book content has no pages"));
        }
        Ok(Self {
            pages,
            current_page: 0,
        })
    }

    /// Creates single-page content.
    pub fn single(page: impl Into<String>) -> Self {
        Self {
            pages: vec![page.into()],
            current_page: 0,
        }
    }

    /// Checks the page invariant, used on values read back from storage.
    pub fn is_valid(&self) -> bool {
        self.current_page < self.pages.len()
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always `false` for a valid value; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// The HTML fragment of the current page.
    pub fn current(&self) -> &str {
        &self.pages[self.current_page]
    }

    /// Moves to the next page. Returns `false` when already on the last one.
    pub fn next_page(&mut self) -> bool {
        if self.current_page + 1 < self.pages.len() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous page. Returns `false` when already on the first one.
    pub fn previous_page(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to `index`, clamped to the last page.
    pub fn go_to(&mut self, index: usize) {
        self.current_page = index.min(self.pages.len() - 1);
    }
}

/// Search parameters for querying a catalog.
///
/// Uses the builder pattern (via `derive_builder`):
///
/// ```rust
/// use folio::types::{SearchParamsBuilder, SortOrder};
///
/// let params = SearchParamsBuilder::default()
///     .query("dune")
///     .limit(Some(10))
///     .sort_by(Some(SortOrder::Newest))
///     .build()
///     .unwrap();
/// assert_eq!(params.effective_limit(), 10);
/// ```
///
/// # Fields
///
/// * `query` - The search query string
/// * `limit` - Maximum number of results, capped at [`MAX_RESULTS`]
/// * `sort_by` - How the catalog should order results
#[derive(Debug, Clone, Default, Builder)]
#[builder(setter(into))]
pub struct SearchParams {
    pub query: String,
    #[builder(default)]
    pub limit: Option<usize>,
    #[builder(default)]
    pub sort_by: Option<SortOrder>,
}

impl SearchParams {
    /// The result count actually requested, always within `1..=MAX_RESULTS`.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(MAX_RESULTS).clamp(1, MAX_RESULTS)
    }
}

/// Defines how search results should be ordered by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Relevance,
    Newest,
}

impl From<String> for SearchParams {
    fn from(query: String) -> Self {
        SearchParams {
            query,
            ..Default::default()
        }
    }
}

impl From<&str> for SearchParams {
    /// Creates search parameters from a string slice.
    ///
    /// ```rust
    /// use folio::types::SearchParams;
    ///
    /// let params: SearchParams = "dune".into();
    /// assert_eq!(params.query, "dune");
    /// assert_eq!(params.limit, None);
    /// ```
    fn from(query: &str) -> Self {
        SearchParams {
            query: query.to_string(),
            ..Default::default()
        }
    }
}
