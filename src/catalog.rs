//! Catalog trait for remote book catalogs.
//!
//! This module defines the [`Catalog`] trait that every book catalog
//! implements. Implementations provide three primitive requests (search,
//! single-book metadata, single page) and inherit the composite operations
//! [`fetch_description`](Catalog::fetch_description) and
//! [`fetch_full_content`](Catalog::fetch_full_content).
//!
//! # Examples
//!
//! ```rust,no_run
//! use folio::prelude::*;
//! use folio::error::Result;
//! # #[cfg(feature = "catalog-google-books")]
//! use folio::catalogs::GoogleBooksCatalog;
//!
//! # #[cfg(feature = "catalog-google-books")]
//! # async fn example() -> Result<()> {
//! let catalog = GoogleBooksCatalog::new();
//!
//! let books = catalog.search("dune".into()).await?;
//! if let Some(book) = books.first() {
//!     let pages = catalog.fetch_full_content(&book.id).await?;
//!     println!("{} has {} pages", book.title, pages.len());
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures::future;
use tracing::debug;

use crate::{
    error::Result,
    types::{Book, BookDetails, SearchParams},
};

/// Placeholder returned when a book has no description.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Trait that all book catalogs must implement.
///
/// # Required Methods
///
/// * [`id()`](Catalog::id) - Unique identifier for the catalog
/// * [`name()`](Catalog::name) - Human-readable name
/// * [`search()`](Catalog::search) - Search for books
/// * [`fetch_details()`](Catalog::fetch_details) - Metadata of one book
/// * [`fetch_page()`](Catalog::fetch_page) - Content of one page of a book
///
/// # Implementation Guidelines
///
/// - Perform HTTP through a [`Transport`](crate::net::Transport)
/// - Map missing optional remote fields to `None`, never to errors
/// - Return transport and shape problems as [`Error`](crate::Error)s; callers
///   decide how they surface
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns the unique identifier for this catalog.
    fn id(&self) -> &'static str;

    /// Returns the human-readable name of this catalog.
    fn name(&self) -> &'static str;

    /// Searches for books matching `params`.
    ///
    /// Returns at most [`SearchParams::effective_limit`] books. A response
    /// without items is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`](crate::Error::Network) / [`Error::Status`](crate::Error::Status) -
    ///   For transport failures
    /// * [`Error::Json`](crate::Error::Json) / [`Error::Parse`](crate::Error::Parse) -
    ///   For malformed responses
    async fn search(&self, params: SearchParams) -> Result<Vec<Book>>;

    /// Fetches the metadata of a single book.
    async fn fetch_details(&self, book_id: &str) -> Result<BookDetails>;

    /// Fetches the content of one page of a book. Pages are numbered from 1.
    async fn fetch_page(&self, book_id: &str, page: u32) -> Result<String>;

    /// Fetches a book's description.
    ///
    /// # Returns
    ///
    /// The description, or [`NO_DESCRIPTION`] when the catalog has none.
    async fn fetch_description(&self, book_id: &str) -> Result<String> {
        let details = self.fetch_details(book_id).await?;
        Ok(details
            .description
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()))
    }

    /// Fetches every page of a book.
    ///
    /// Issues exactly one metadata request. When it reports a page count,
    /// all pages `1..=page_count` are requested concurrently and returned in
    /// page order. Without a page count the result is a single page holding
    /// the description (or [`NO_DESCRIPTION`]).
    ///
    /// # Errors
    ///
    /// Fails as soon as any request fails; no partial page list is returned.
    async fn fetch_full_content(&self, book_id: &str) -> Result<Vec<String>> {
        let details = self.fetch_details(book_id).await?;

        match details.page_count.filter(|&count| count > 0) {
            Some(page_count) => {
                debug!(catalog = self.id(), book_id, page_count, "fetching all pages");
                let requests = (1..=page_count).map(|page| self.fetch_page(book_id, page));
                future::try_join_all(requests).await
            }
            None => Ok(vec![
                details
                    .description
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            ]),
        }
    }
}
