//! Book catalog implementations with conditional compilation support.
//!
//! Each catalog is behind its own feature flag so minimal builds only include
//! the catalogs they need:
//!
//! - `catalog-google-books` - Enables the Google Books catalog
//! - `all-catalogs` - Enables all catalogs (default)
//!
//! ```bash
//! cargo build --no-default-features --features catalog-google-books
//! ```

#[cfg(feature = "catalog-google-books")]
pub mod google_books;

#[cfg(feature = "catalog-google-books")]
pub use google_books::GoogleBooksCatalog;
