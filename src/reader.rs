//! Reader controller: fetch-or-cache orchestration for the selected book.
//!
//! The controller owns the reader state machine:
//!
//! ```text
//! Closed ──select(book)──▶ Idle ──▶ Loading ──▶ Ready
//!                                           └──▶ Failed
//! any ──select(None) / close()──▶ Closed
//! ```
//!
//! Content is looked up in the [`ContentCache`] first; only a miss reaches the
//! catalog, and only complete content is ever cached. Displayable HTML is
//! obtained exclusively through [`ReaderController::rendered_page`], which
//! sanitizes the current page.
//!
//! All methods take `&self`, so a controller can be shared in an `Arc` between
//! the task performing a load and the UI observing its state.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::{
    assembler,
    cache::ContentCache,
    catalog::Catalog,
    net::html::{self, SafeHtml},
    types::{Book, BookContent},
};

/// Message shown when content cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load book content. Please try again later.";

/// State of the reader for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReaderState {
    /// No book selected.
    #[default]
    Closed,
    /// A book was selected and loading has not started.
    Idle { book: Book },
    /// Content is being looked up or fetched.
    Loading { book: Book },
    /// Content is available.
    Ready { book: Book, content: BookContent },
    /// Loading failed; `message` is suitable for display.
    Failed { book: Book, message: String },
}

impl ReaderState {
    pub fn book(&self) -> Option<&Book> {
        match self {
            ReaderState::Closed => None,
            ReaderState::Idle { book }
            | ReaderState::Loading { book }
            | ReaderState::Ready { book, .. }
            | ReaderState::Failed { book, .. } => Some(book),
        }
    }

    pub fn content(&self) -> Option<&BookContent> {
        match self {
            ReaderState::Ready { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ReaderState::Idle { .. } | ReaderState::Loading { .. })
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, ReaderState::Closed)
    }
}

/// Orchestrates content loading for the selected book.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use folio::cache::{ContentCache, MemoryStore};
/// use folio::prelude::*;
/// # #[cfg(feature = "catalog-google-books")]
/// use folio::catalogs::GoogleBooksCatalog;
///
/// # #[cfg(feature = "catalog-google-books")]
/// # async fn example(book: Book) {
/// let reader = ReaderController::new(
///     Arc::new(GoogleBooksCatalog::new()),
///     ContentCache::new(Arc::new(MemoryStore::new())),
/// );
///
/// match reader.select(Some(book)).await {
///     ReaderState::Ready { .. } => {
///         let page = reader.rendered_page().unwrap();
///         println!("{}", page);
///     }
///     ReaderState::Failed { message, .. } => eprintln!("{}", message),
///     _ => {}
/// }
/// # }
/// ```
pub struct ReaderController {
    catalog: Arc<dyn Catalog>,
    cache: ContentCache,
    state: Mutex<ReaderState>,
    session: AtomicU64,
}

impl ReaderController {
    pub fn new(catalog: Arc<dyn Catalog>, cache: ContentCache) -> Self {
        Self {
            catalog,
            cache,
            state: Mutex::new(ReaderState::Closed),
            session: AtomicU64::new(0),
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> ReaderState {
        self.state.lock().clone()
    }

    /// Selects `book` (or closes the reader for `None`) and loads its content.
    ///
    /// Returns the state once this selection has settled. If another
    /// selection is made while this one is loading, this call's result is
    /// discarded and the newer state is returned instead.
    pub async fn select(&self, book: Option<Book>) -> ReaderState {
        let Some(book) = book else {
            self.close();
            return ReaderState::Closed;
        };

        let session = self.session.fetch_add(1, Ordering::SeqCst) + 1;
        self.apply(session, ReaderState::Idle { book: book.clone() });
        self.apply(session, ReaderState::Loading { book: book.clone() });

        let next = match self.cache.load(&book.id) {
            Some(content) => {
                info!(book_id = %book.id, "reader: cache hit");
                ReaderState::Ready { book, content }
            }
            None => {
                info!(book_id = %book.id, "reader: cache miss, fetching");
                self.fetch(book).await
            }
        };

        if !self.apply(session, next) {
            debug!(session, "reader: selection superseded, result discarded");
        }
        self.state()
    }

    async fn fetch(&self, book: Book) -> ReaderState {
        match assembler::assemble(self.catalog.as_ref(), &book).await {
            Ok(content) => {
                if let Err(e) = self.cache.store(&book.id, &content) {
                    warn!(book_id = %book.id, error = %e, "reader: failed to cache content");
                }
                ReaderState::Ready { book, content }
            }
            Err(e) => {
                warn!(book_id = %book.id, error = %e, "reader: failed to load content");
                ReaderState::Failed {
                    book,
                    message: LOAD_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Closes the reader, discarding in-memory content. The cache is kept.
    pub fn close(&self) {
        self.session.fetch_add(1, Ordering::SeqCst);
        *self.state.lock() = ReaderState::Closed;
    }

    /// Stores `next` if `session` is still the latest selection.
    fn apply(&self, session: u64, next: ReaderState) -> bool {
        let mut state = self.state.lock();
        if self.session.load(Ordering::SeqCst) != session {
            return false;
        }
        *state = next;
        true
    }

    /// The current page, sanitized for display.
    ///
    /// `None` unless the reader is [`ReaderState::Ready`].
    pub fn rendered_page(&self) -> Option<SafeHtml> {
        let state = self.state.lock();
        state.content().map(|content| html::sanitize(content.current()))
    }

    /// `(current_page, page_count)` when content is loaded.
    pub fn position(&self) -> Option<(usize, usize)> {
        let state = self.state.lock();
        state
            .content()
            .map(|content| (content.current_page(), content.len()))
    }

    /// Moves to the next page. Returns `false` when not possible.
    pub fn next_page(&self) -> bool {
        self.with_content(BookContent::next_page).unwrap_or(false)
    }

    /// Moves to the previous page. Returns `false` when not possible.
    pub fn previous_page(&self) -> bool {
        self.with_content(BookContent::previous_page).unwrap_or(false)
    }

    /// Jumps to `index`, clamped to the last page.
    pub fn go_to_page(&self, index: usize) {
        self.with_content(|content| content.go_to(index));
    }

    fn with_content<R>(&self, f: impl FnOnce(&mut BookContent) -> R) -> Option<R> {
        let mut state = self.state.lock();
        match &mut *state {
            ReaderState::Ready { content, .. } => Some(f(content)),
            _ => None,
        }
    }
}
