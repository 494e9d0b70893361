//! # Folio - Book search and reading core
//!
//! Folio searches a remote book catalog, assembles the readable content of a
//! selected book, caches it locally and turns catalog-supplied HTML into
//! something that is safe to display.
//!
//! ## Features
//!
//! - **Catalog Abstraction**: Remote catalogs behind the [`Catalog`] trait, Google Books built in
//! - **Concurrent Page Fetching**: Every page of a fully viewable book is requested at once
//! - **Local Cache**: Assembled content is stored per book and reused across sessions
//! - **Sanitize Before Render**: Displayable HTML only exists as [`SafeHtml`]
//! - **Stale Response Protection**: Searches and selections discard superseded responses
//! - **Robust Error Handling**: One error type, surfaced as empty results or failure states
//!
//! ## Quick Start
//!
//! ### Searching for Books
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use folio::prelude::*;
//! #[cfg(feature = "catalog-google-books")]
//! use folio::catalogs::GoogleBooksCatalog;
//!
//! #[tokio::main]
//! async fn main() {
//!     #[cfg(feature = "catalog-google-books")]
//!     {
//!         let search = SearchController::new(Arc::new(GoogleBooksCatalog::new()));
//!
//!         search.submit("dune").await;
//!         for book in search.results() {
//!             println!("{} by {}", book.title, book.authors_line());
//!         }
//!     }
//! }
//! ```
//!
//! ### Reading a Book
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use folio::prelude::*;
//! use folio::cache::FileStore;
//! #[cfg(feature = "catalog-google-books")]
//! use folio::catalogs::GoogleBooksCatalog;
//!
//! # #[cfg(feature = "catalog-google-books")]
//! # async fn example(book: Book) -> folio::Result<()> {
//! let store = FileStore::open("./cache")?;
//! let reader = ReaderController::new(
//!     Arc::new(GoogleBooksCatalog::new()),
//!     ContentCache::new(Arc::new(store)),
//! );
//!
//! reader.select(Some(book)).await;
//! while let Some(page) = reader.rendered_page() {
//!     println!("{}", page);
//!     if !reader.next_page() {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`catalog`]: Core trait for remote book catalogs
//! - [`catalogs`]: Catalog implementations behind feature flags
//! - [`assembler`]: Chooses and executes the retrieval strategy for a book
//! - [`reader`]: Reader state machine with fetch-or-cache orchestration
//! - [`search`]: Search submission and result list state
//! - [`cache`]: Key/value persistence and the content cache on top of it
//! - [`net`]: HTTP transport and the HTML sanitizer
//! - [`config`]: Settings from `folio.toml` and the environment
//! - [`theme`]: Persisted light/dark preference
//! - [`types`]: Core data structures for books, content and search parameters
//! - [`error`]: Error handling

pub mod assembler;
pub mod cache;
pub mod catalog;
pub mod catalogs;
pub mod config;
pub mod error;
pub mod net;
pub mod reader;
pub mod search;
pub mod theme;
pub mod types;

#[cfg(feature = "tui")]
pub mod tui;

/// Prelude module for convenient imports.
///
/// ```rust
/// use folio::prelude::*;
///
/// // Now you have access to:
/// // - Catalog trait
/// // - SearchController, ReaderController and their states
/// // - Book, BookContent, SearchParams, SortOrder
/// // - ContentCache, CacheStore, sanitize, SafeHtml
/// ```
pub mod prelude {
    pub use crate::{
        cache::{CacheStore, ContentCache},
        catalog::Catalog,
        net::html::{SafeHtml, sanitize},
        reader::{ReaderController, ReaderState},
        search::{SearchController, SearchOutcome, SearchState},
        theme::Theme,
        types::{Book, BookContent, BookDetails, SearchParams, SortOrder, Viewability},
    };
}

// Re-export main types at crate root for direct access
pub use cache::{CacheStore, ContentCache};
pub use catalog::Catalog;
pub use error::{Error, Result};
pub use net::html::{SafeHtml, sanitize};
pub use reader::{ReaderController, ReaderState};
pub use search::{SearchController, SearchOutcome};
pub use types::{Book, BookContent, BookDetails, SearchParams, SortOrder};
