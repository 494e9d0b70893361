//! Reader controller tests: fetch-or-cache, failure handling and supersession.

use folio::assembler::NO_PREVIEW;
use folio::cache::{ContentCache, MemoryStore};
use folio::prelude::*;
use folio::reader::LOAD_FAILED_MESSAGE;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::*;

fn reader_over(transport: &FakeTransport, store: Arc<MemoryStore>) -> ReaderController {
    ReaderController::new(Arc::new(catalog(transport)), ContentCache::new(store))
}

fn route_full_book(transport: &FakeTransport, id: &str, pages: u32) {
    transport.route(
        volume_url(id),
        volume(id, "Full", "ALL_PAGES", Some(pages), None).to_string(),
    );
    for page in 1..=pages {
        transport.route(page_url(id, page), format!("<p>Page {}</p>", page));
    }
}

#[cfg(test)]
mod reader_tests {
    use super::*;

    #[tokio::test]
    async fn test_fully_viewable_book_loads_all_pages() {
        let transport = FakeTransport::new();
        route_full_book(&transport, "full1", 3);
        let store = Arc::new(MemoryStore::new());
        let reader = reader_over(&transport, store.clone());

        let state = reader.select(Some(book("full1", true, None))).await;

        let content = state.content().expect("content loaded");
        assert_eq!(
            content.pages().to_vec(),
            vec!["<p>Page 1</p>", "<p>Page 2</p>", "<p>Page 3</p>"]
        );
        assert_eq!(content.current_page(), 0);
        assert_eq!(transport.request_count(), 4);
        assert!(store.contains_key("book_full1"));
        assert_eq!(reader.position(), Some((0, 3)));
    }

    #[tokio::test]
    async fn test_cached_book_makes_no_requests() {
        let store = Arc::new(MemoryStore::new());

        let first = FakeTransport::new();
        route_full_book(&first, "full1", 2);
        let loaded = reader_over(&first, store.clone())
            .select(Some(book("full1", true, None)))
            .await;

        let second = FakeTransport::new();
        let reader = reader_over(&second, store);
        let state = reader.select(Some(book("full1", true, None))).await;

        assert_eq!(second.request_count(), 0);
        assert_eq!(
            state.content().map(BookContent::pages),
            loaded.content().map(BookContent::pages)
        );
        assert_eq!(state.content().map(BookContent::current_page), Some(0));
    }

    #[tokio::test]
    async fn test_summary_book_uses_description_without_requests() {
        let transport = FakeTransport::new();
        let reader = reader_over(&transport, Arc::new(MemoryStore::new()));

        let state = reader
            .select(Some(book("part1", false, Some("<p>About</p>"))))
            .await;
        assert_eq!(
            state.content().map(BookContent::pages),
            Some(&["<p>About</p>".to_string()][..])
        );

        let state = reader.select(Some(book("part2", false, None))).await;
        assert_eq!(state.content().map(BookContent::current), Some(NO_PREVIEW));

        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_load_is_reported_and_not_cached() {
        let transport = FakeTransport::new();
        route_full_book(&transport, "full1", 3);
        transport.route_status(page_url("full1", 2), 500);
        let store = Arc::new(MemoryStore::new());
        let reader = reader_over(&transport, store.clone());

        let state = reader.select(Some(book("full1", true, None))).await;

        match state {
            ReaderState::Failed { book, message } => {
                assert_eq!(book.id, "full1");
                assert_eq!(message, LOAD_FAILED_MESSAGE);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(store.is_empty());
        assert!(reader.rendered_page().is_none());
    }

    #[tokio::test]
    async fn test_select_none_and_close_reset_state() {
        let transport = FakeTransport::new();
        let reader = reader_over(&transport, Arc::new(MemoryStore::new()));

        reader.select(Some(book("part1", false, None))).await;
        assert!(reader.state().is_open());

        assert_eq!(reader.select(None).await, ReaderState::Closed);

        reader.select(Some(book("part1", false, None))).await;
        reader.close();
        assert_eq!(reader.state(), ReaderState::Closed);
        assert!(reader.position().is_none());
    }

    #[tokio::test]
    async fn test_newer_selection_wins_over_slow_load() {
        let transport = FakeTransport::new();
        transport.route_delayed(
            volume_url("slow1"),
            volume("slow1", "Slow", "ALL_PAGES", Some(1), None).to_string(),
            Duration::from_millis(150),
        );
        transport.route(page_url("slow1", 1), "<p>Slow</p>");
        let store = Arc::new(MemoryStore::new());
        let reader = reader_over(&transport, store.clone());

        let (first, second) = tokio::join!(reader.select(Some(book("slow1", true, None))), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            reader.select(Some(book("fast1", false, Some("<p>Fast</p>")))).await
        });

        assert_eq!(second.book().map(|b| b.id.as_str()), Some("fast1"));
        assert_eq!(first.book().map(|b| b.id.as_str()), Some("fast1"));
        assert_eq!(
            reader.state().content().map(BookContent::current),
            Some("<p>Fast</p>")
        );
        // The abandoned load still completes into the cache.
        assert!(store.contains_key("book_slow1"));
    }

    #[tokio::test]
    async fn test_loading_state_is_visible_while_fetching() {
        let transport = FakeTransport::new();
        transport.route_delayed(
            volume_url("slow1"),
            volume("slow1", "Slow", "ALL_PAGES", Some(1), None).to_string(),
            Duration::from_millis(100),
        );
        transport.route(page_url("slow1", 1), "<p>Slow</p>");
        let reader = Arc::new(reader_over(&transport, Arc::new(MemoryStore::new())));

        let task = tokio::spawn({
            let reader = reader.clone();
            async move { reader.select(Some(book("slow1", true, None))).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(matches!(reader.state(), ReaderState::Loading { .. }));
        assert!(matches!(task.await.unwrap(), ReaderState::Ready { .. }));
    }

    #[tokio::test]
    async fn test_rendered_page_is_sanitized() {
        let transport = FakeTransport::new();
        let reader = reader_over(&transport, Arc::new(MemoryStore::new()));

        reader
            .select(Some(book(
                "part1",
                false,
                Some(r#"<p onclick="steal()">Hello</p><script>alert(1)</script>"#),
            )))
            .await;

        let page = reader.rendered_page().unwrap();
        assert_eq!(page.as_str(), "<p>Hello</p>");
    }

    #[tokio::test]
    async fn test_page_navigation() {
        let transport = FakeTransport::new();
        route_full_book(&transport, "full1", 3);
        let reader = reader_over(&transport, Arc::new(MemoryStore::new()));
        reader.select(Some(book("full1", true, None))).await;

        assert!(!reader.previous_page());
        assert!(reader.next_page());
        assert_eq!(reader.rendered_page().unwrap().as_str(), "<p>Page 2</p>");

        reader.go_to_page(99);
        assert_eq!(reader.position(), Some((2, 3)));
        assert!(!reader.next_page());
    }
}
