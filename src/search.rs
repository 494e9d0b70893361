//! Search controller: query submission and result list state.
//!
//! [`SearchController::submit`] is the search boundary. Catalog errors never
//! escape it: they become an empty result list, a logged warning and a
//! `last_error` in the state.
//!
//! Every submission takes a sequence number. A response is applied only if
//! no newer submission has started in the meantime, so a slow earlier search
//! can never overwrite the results of a later one.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use folio::prelude::*;
//! # #[cfg(feature = "catalog-google-books")]
//! use folio::catalogs::GoogleBooksCatalog;
//!
//! # #[cfg(feature = "catalog-google-books")]
//! # async fn example() {
//! let search = SearchController::new(Arc::new(GoogleBooksCatalog::new()));
//!
//! match search.submit("dune").await {
//!     SearchOutcome::Applied(count) => println!("{} results", count),
//!     SearchOutcome::Empty => println!("nothing found"),
//!     SearchOutcome::Failed(message) => println!("search failed: {}", message),
//!     SearchOutcome::Ignored | SearchOutcome::Superseded => {}
//! }
//!
//! for book in search.results() {
//!     println!("{}", book.title);
//! }
//! # }
//! ```

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::{
    catalog::Catalog,
    types::{Book, MAX_RESULTS, SearchParams, SortOrder},
};

/// Observable state of the search view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// The query of the last applied search.
    pub query: String,
    pub results: Vec<Book>,
    pub loading: bool,
    /// Diagnostic of the last failed search, cleared by the next applied one.
    pub last_error: Option<String>,
}

/// What happened to a submitted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query was empty after trimming; nothing was requested.
    Ignored,
    /// Results were replaced with this many books.
    Applied(usize),
    /// The catalog found nothing; results are now empty.
    Empty,
    /// The catalog request failed; results are now empty.
    Failed(String),
    /// A newer search started before this one finished; its response was dropped.
    Superseded,
}

/// Orchestrates searches against a catalog.
pub struct SearchController {
    catalog: Arc<dyn Catalog>,
    limit: usize,
    sort_by: Option<SortOrder>,
    state: Mutex<SearchState>,
    latest: AtomicU64,
}

impl SearchController {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            limit: MAX_RESULTS,
            sort_by: None,
            state: Mutex::new(SearchState::default()),
            latest: AtomicU64::new(0),
        }
    }

    /// Sets the number of results requested, capped at [`MAX_RESULTS`].
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_RESULTS);
        self
    }

    pub fn with_sort(mut self, sort_by: SortOrder) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    /// Submits `query`.
    ///
    /// Empty or whitespace-only queries are ignored without touching the
    /// state. Otherwise the loading flag is raised for the duration of the
    /// request and the results are replaced, unless a newer submission has
    /// superseded this one.
    pub async fn submit(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Ignored;
        }

        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.lock().loading = true;

        let params = SearchParams {
            query: query.to_string(),
            limit: Some(self.limit),
            sort_by: self.sort_by,
        };
        let result = self.catalog.search(params).await;

        let mut state = self.state.lock();
        if self.latest.load(Ordering::SeqCst) != seq {
            debug!(seq, %query, "search superseded, dropping response");
            return SearchOutcome::Superseded;
        }

        state.loading = false;
        state.query = query.to_string();
        match result {
            Ok(books) => {
                info!(%query, count = books.len(), catalog = self.catalog.id(), "search complete");
                state.last_error = None;
                state.results = books;
                if state.results.is_empty() {
                    SearchOutcome::Empty
                } else {
                    SearchOutcome::Applied(state.results.len())
                }
            }
            Err(e) => {
                warn!(%query, error = %e, catalog = self.catalog.id(), "search failed");
                let message = e.to_string();
                state.results.clear();
                state.last_error = Some(message.clone());
                SearchOutcome::Failed(message)
            }
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.state.lock().clone()
    }

    pub fn results(&self) -> Vec<Book> {
        self.state.lock().results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Clears results and abandons any in-flight search.
    pub fn clear(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        *self.state.lock() = SearchState::default();
    }
}
