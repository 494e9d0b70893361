//! Content assembly: deciding how a book's pages are obtained.
//!
//! [`plan`] is a pure decision over a [`Book`]; [`execute`] carries the plan
//! out against a [`Catalog`]. Fully viewable books have every page fetched,
//! anything else is shown as a single page built from the description.
//!
//! ```rust
//! use folio::assembler::{self, RetrievalPlan};
//! use folio::types::Book;
//!
//! let book = Book {
//!     id: "abc123".into(),
//!     title: "Dune".into(),
//!     authors: None,
//!     description: None,
//!     thumbnail_url: None,
//!     preview_url: None,
//!     fully_viewable: false,
//! };
//!
//! assert_eq!(
//!     assembler::plan(&book),
//!     RetrievalPlan::Summary { page: "No preview available.".into() }
//! );
//! ```

use tracing::debug;

use crate::{
    catalog::Catalog,
    error::Result,
    types::{Book, BookContent},
};

/// Placeholder page for books that cannot be previewed.
pub const NO_PREVIEW: &str = "No preview available.";

/// How the content of a book will be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalPlan {
    /// Fetch every page through [`Catalog::fetch_full_content`].
    FullContent { book_id: String },
    /// Show a single, already known page. No I/O.
    Summary { page: String },
}

/// Chooses the retrieval strategy for `book`.
pub fn plan(book: &Book) -> RetrievalPlan {
    if book.fully_viewable {
        RetrievalPlan::FullContent {
            book_id: book.id.clone(),
        }
    } else {
        RetrievalPlan::Summary {
            page: book
                .description
                .clone()
                .unwrap_or_else(|| NO_PREVIEW.to_string()),
        }
    }
}

/// Carries out `plan`, returning content positioned on the first page.
///
/// # Errors
///
/// Any error from [`Catalog::fetch_full_content`], or
/// [`Error::EmptyResult`](crate::Error::EmptyResult) if it yields no pages.
pub async fn execute(catalog: &dyn Catalog, plan: RetrievalPlan) -> Result<BookContent> {
    match plan {
        RetrievalPlan::FullContent { book_id } => {
            let pages = catalog.fetch_full_content(&book_id).await?;
            debug!(%book_id, pages = pages.len(), "assembled full content");
            BookContent::new(pages)
        }
        RetrievalPlan::Summary { page } => Ok(BookContent::single(page)),
    }
}

/// Plans and executes retrieval for `book`.
pub async fn assemble(catalog: &dyn Catalog, book: &Book) -> Result<BookContent> {
    execute(catalog, plan(book)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(fully_viewable: bool, description: Option<&str>) -> Book {
        Book {
            id: "vol-1".into(),
            title: "Title".into(),
            authors: None,
            description: description.map(String::from),
            thumbnail_url: None,
            preview_url: None,
            fully_viewable,
        }
    }

    #[test]
    fn test_plan_full_content_for_fully_viewable() {
        assert_eq!(
            plan(&book(true, Some("ignored"))),
            RetrievalPlan::FullContent {
                book_id: "vol-1".into()
            }
        );
    }

    #[test]
    fn test_plan_summary_uses_description() {
        assert_eq!(
            plan(&book(false, Some("<p>About</p>"))),
            RetrievalPlan::Summary {
                page: "<p>About</p>".into()
            }
        );
    }

    #[test]
    fn test_plan_summary_placeholder() {
        assert_eq!(
            plan(&book(false, None)),
            RetrievalPlan::Summary {
                page: NO_PREVIEW.into()
            }
        );
    }
}
