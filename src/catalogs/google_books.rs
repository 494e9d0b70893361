use crate::{
    catalog::Catalog,
    config::Settings,
    error::{Error, Result},
    net::{HttpClient, Transport},
    types::{Book, BookDetails, SearchParams, SortOrder, Viewability},
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Default API root of the Google Books volumes API.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/books/v1";

/// Volume list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeListResponse {
    #[serde(default)]
    items: Vec<Volume>,
    #[serde(default)]
    total_items: Option<u64>,
}

/// A single volume, as returned by both search and lookup
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: String,
    #[serde(default)]
    volume_info: VolumeInfo,
    #[serde(default)]
    access_info: AccessInfo,
}

/// Volume bibliographic attributes
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    description: Option<String>,
    image_links: Option<ImageLinks>,
    preview_link: Option<String>,
    page_count: Option<u32>,
}

/// Cover image links
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

/// Volume access attributes
#[derive(Debug, Default, Deserialize)]
struct AccessInfo {
    viewability: Option<String>,
}

impl Volume {
    fn viewability(&self) -> Viewability {
        self.access_info
            .viewability
            .as_deref()
            .map(Viewability::parse)
            .unwrap_or_default()
    }
}

/// Google Books catalog.
///
/// Talks to the public volumes API: full-text search, single volume lookup
/// and per-page content of fully viewable volumes.
///
/// # Type Parameters
///
/// * `T` - The [`Transport`] used for HTTP, [`HttpClient`] by default
///
/// # Examples
///
/// ```rust,no_run
/// use folio::catalogs::GoogleBooksCatalog;
/// use folio::prelude::*;
///
/// # async fn example() -> folio::Result<()> {
/// let catalog = GoogleBooksCatalog::new();
///
/// let books = catalog.search(SearchParams {
///     query: "dune".to_string(),
///     limit: Some(10),
///     ..Default::default()
/// }).await?;
///
/// for book in &books {
///     println!("{} by {}", book.title, book.authors_line());
/// }
/// # Ok(())
/// # }
/// ```
pub struct GoogleBooksCatalog<T: Transport = HttpClient> {
    transport: T,
    api_base: String,
    api_key: Option<String>,
}

impl GoogleBooksCatalog<HttpClient> {
    /// Create a catalog against the public API with default settings
    pub fn new() -> Self {
        Self::with_transport(HttpClient::new("google-books"), DEFAULT_API_BASE)
    }

    /// Create a catalog from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        let client = HttpClient::new("google-books").with_header("User-Agent", &settings.user_agent);
        let mut catalog = Self::with_transport(client, &settings.api_base);
        catalog.api_key = settings.api_key.clone();
        catalog
    }
}

impl Default for GoogleBooksCatalog<HttpClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> GoogleBooksCatalog<T> {
    /// Create a catalog over an arbitrary transport
    pub fn with_transport(transport: T, api_base: impl Into<String>) -> Self {
        Self {
            transport,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Attach an API key to every request
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Format search query parameters
    fn format_search_query(&self, params: &SearchParams) -> String {
        let mut query_parts = vec![
            format!("q={}", urlencoding::encode(params.query.trim())),
            format!("maxResults={}", params.effective_limit()),
        ];

        if let Some(SortOrder::Newest) = params.sort_by {
            query_parts.push("orderBy=newest".to_string());
        }

        if let Some(key) = &self.api_key {
            query_parts.push(format!("key={}", urlencoding::encode(key)));
        }

        query_parts.join("&")
    }

    fn volume_url(&self, book_id: &str) -> String {
        self.with_key(format!(
            "{}/volumes/{}",
            self.api_base,
            urlencoding::encode(book_id)
        ))
    }

    fn page_url(&self, book_id: &str, page: u32) -> String {
        self.with_key(format!(
            "{}/volumes/{}/pages/{}",
            self.api_base,
            urlencoding::encode(book_id),
            page
        ))
    }

    fn with_key(&self, url: String) -> String {
        match &self.api_key {
            Some(key) => format!("{}?key={}", url, urlencoding::encode(key)),
            None => url,
        }
    }

    /// Map a remote volume to the internal Book structure
    fn map_volume_to_book(volume: Volume) -> Book {
        let fully_viewable = volume.viewability().is_full();
        let info = volume.volume_info;

        let thumbnail_url = info
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail));

        Book {
            id: volume.id,
            title: info
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            authors: info.authors.filter(|authors| !authors.is_empty()),
            description: info.description.filter(|d| !d.trim().is_empty()),
            thumbnail_url,
            preview_url: info.preview_link,
            fully_viewable,
        }
    }

    fn map_volume_to_details(volume: Volume) -> BookDetails {
        BookDetails {
            id: volume.id,
            description: volume
                .volume_info
                .description
                .filter(|d| !d.trim().is_empty()),
            page_count: volume.volume_info.page_count,
        }
    }
}

#[async_trait]
impl<T: Transport> Catalog for GoogleBooksCatalog<T> {
    fn id(&self) -> &'static str {
        "gbooks"
    }

    fn name(&self) -> &'static str {
        "Google Books"
    }

    async fn search(&self, params: SearchParams) -> Result<Vec<Book>> {
        let limit = params.effective_limit();
        let search_url = format!("{}/volumes?{}", self.api_base, self.format_search_query(&params));

        let body = self.transport.get(&search_url).await?;
        let response: VolumeListResponse = serde_json::from_slice(&body)?;
        debug!(
            total = ?response.total_items,
            returned = response.items.len(),
            "search response"
        );

        Ok(response
            .items
            .into_iter()
            .take(limit)
            .map(Self::map_volume_to_book)
            .collect())
    }

    async fn fetch_details(&self, book_id: &str) -> Result<BookDetails> {
        let body = self.transport.get(&self.volume_url(book_id)).await?;
        let volume: Volume = serde_json::from_slice(&body)?;

        if volume.id != book_id {
            return Err(Error::parse(format!(
                "Requested volume {} but received {}",
                book_id, volume.id
            )));
        }

        Ok(Self::map_volume_to_details(volume))
    }

    async fn fetch_page(&self, book_id: &str, page: u32) -> Result<String> {
        self.transport.get_text(&self.page_url(book_id, page)).await
    }
}
