//! Common test utilities and constants
//!
//! Shared functionality used across all test modules: a scripted transport
//! that records every request, and JSON fixtures shaped like catalog responses.

use async_trait::async_trait;
use bytes::Bytes;
use folio::{Error, catalogs::GoogleBooksCatalog, net::Transport, types::Book};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc, time::Duration};

#[allow(dead_code)]
pub const TEST_API_BASE: &str = "http://books.test/v1";

#[derive(Clone)]
struct Route {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

#[derive(Default)]
struct FakeState {
    routes: HashMap<String, Route>,
    requests: Vec<String>,
}

/// Transport answering from a fixed URL table.
///
/// Unrouted URLs fail with a 404 status error. Clones share routes and the
/// request log, so a test can keep a handle after giving one to a catalog.
#[derive(Clone, Default)]
pub struct FakeTransport {
    inner: Arc<Mutex<FakeState>>,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, url: impl Into<String>, body: impl Into<String>) -> &Self {
        self.insert(url, 200, body, None)
    }

    pub fn route_status(&self, url: impl Into<String>, status: u16) -> &Self {
        self.insert(url, status, "", None)
    }

    pub fn route_delayed(
        &self,
        url: impl Into<String>,
        body: impl Into<String>,
        delay: Duration,
    ) -> &Self {
        self.insert(url, 200, body, Some(delay))
    }

    fn insert(
        &self,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
        delay: Option<Duration>,
    ) -> &Self {
        self.inner.lock().routes.insert(
            url.into(),
            Route {
                status,
                body: body.into(),
                delay,
            },
        );
        self
    }

    /// Every requested URL, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().requests.len()
    }

    pub fn count_matching(&self, fragment: &str) -> usize {
        self.inner
            .lock()
            .requests
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> folio::Result<Bytes> {
        let route = {
            let mut state = self.inner.lock();
            state.requests.push(url.to_string());
            state.routes.get(url).cloned()
        };

        let Some(route) = route else {
            return Err(Error::status(404, url));
        };
        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }
        if !(200..300).contains(&route.status) {
            return Err(Error::status(route.status, url));
        }
        Ok(Bytes::from(route.body))
    }
}

/// A catalog over `transport` pointed at [`TEST_API_BASE`].
#[allow(dead_code)]
pub fn catalog(transport: &FakeTransport) -> GoogleBooksCatalog<FakeTransport> {
    GoogleBooksCatalog::with_transport(transport.clone(), TEST_API_BASE)
}

#[allow(dead_code)]
pub fn search_url(query: &str, limit: usize) -> String {
    format!(
        "{}/volumes?q={}&maxResults={}",
        TEST_API_BASE,
        urlencoding::encode(query),
        limit
    )
}

#[allow(dead_code)]
pub fn volume_url(id: &str) -> String {
    format!("{}/volumes/{}", TEST_API_BASE, id)
}

#[allow(dead_code)]
pub fn page_url(id: &str, page: u32) -> String {
    format!("{}/volumes/{}/pages/{}", TEST_API_BASE, id, page)
}

/// A volume resource with the fields the catalog reads.
#[allow(dead_code)]
pub fn volume(
    id: &str,
    title: &str,
    viewability: &str,
    page_count: Option<u32>,
    description: Option<&str>,
) -> Value {
    let mut info = json!({
        "title": title,
        "authors": ["Frank Herbert"],
        "imageLinks": { "thumbnail": format!("http://img.test/{}.jpg", id) },
        "previewLink": format!("http://books.test/preview/{}", id),
    });
    if let Some(count) = page_count {
        info["pageCount"] = json!(count);
    }
    if let Some(description) = description {
        info["description"] = json!(description);
    }

    json!({
        "id": id,
        "volumeInfo": info,
        "accessInfo": { "viewability": viewability },
    })
}

#[allow(dead_code)]
pub fn search_response(items: Vec<Value>) -> String {
    json!({ "totalItems": items.len(), "items": items }).to_string()
}

/// A book as the catalog would map it, for controller tests.
#[allow(dead_code)]
pub fn book(id: &str, fully_viewable: bool, description: Option<&str>) -> Book {
    Book {
        id: id.to_string(),
        title: format!("Book {}", id),
        authors: Some(vec!["Frank Herbert".to_string()]),
        description: description.map(String::from),
        thumbnail_url: None,
        preview_url: None,
        fully_viewable,
    }
}
