use folio::cache::{CacheStore, ContentCache, FileStore, MemoryStore};
use folio::prelude::*;
use folio::types::{MAX_RESULTS, SearchParamsBuilder};
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_builder() {
        let params = SearchParamsBuilder::default()
            .query("dune")
            .limit(Some(10))
            .sort_by(Some(SortOrder::Newest))
            .build()
            .unwrap();

        assert_eq!(params.query, "dune");
        assert_eq!(params.limit, Some(10));
        assert_eq!(params.effective_limit(), 10);
        assert!(matches!(params.sort_by, Some(SortOrder::Newest)));
    }

    #[test]
    fn test_search_params_limit_bounds() {
        let params = SearchParams::from("dune");
        assert_eq!(params.effective_limit(), MAX_RESULTS);

        let zero = SearchParams {
            limit: Some(0),
            ..SearchParams::from("dune")
        };
        assert_eq!(zero.effective_limit(), 1);

        let huge = SearchParams {
            limit: Some(1_000),
            ..SearchParams::from("dune")
        };
        assert_eq!(huge.effective_limit(), MAX_RESULTS);
    }

    #[test]
    fn test_book_content_rejects_empty_pages() {
        let result = BookContent::new(Vec::new());
        assert!(matches!(result, Err(folio::Error::EmptyResult(_))));
    }

    #[test]
    fn test_book_content_navigation() {
        let mut content =
            BookContent::new(vec!["a".to_string(), "b".to_string(), "c".to_string()]).unwrap();

        assert!(!content.previous_page());
        assert!(content.next_page());
        assert!(content.next_page());
        assert!(!content.next_page());
        assert_eq!(content.current(), "c");

        content.go_to(0);
        assert_eq!(content.current_page(), 0);
        content.go_to(usize::MAX);
        assert_eq!(content.current_page(), 2);
    }

    #[test]
    fn test_book_content_wire_format() {
        let mut content = BookContent::new(vec!["<p>1</p>".into(), "<p>2</p>".into()]).unwrap();
        content.next_page();

        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "pages": ["<p>1</p>", "<p>2</p>"], "currentPage": 1 })
        );
    }

    #[test]
    fn test_content_cache_key_and_roundtrip() {
        let store = Arc::new(MemoryStore::new());
        let cache = ContentCache::new(store.clone());
        let content = BookContent::new(vec!["x".into(), "y".into()]).unwrap();

        cache.store("abc123", &content).unwrap();

        assert_eq!(ContentCache::key("abc123"), "book_abc123");
        assert!(store.contains_key("book_abc123"));
        assert_eq!(cache.load("abc123"), Some(content));
        assert!(cache.load("other").is_none());
    }

    #[test]
    fn test_content_cache_ignores_corrupt_entries() {
        let store = Arc::new(MemoryStore::new());
        let cache = ContentCache::new(store.clone());

        store.set("book_bad1", "{not json").unwrap();
        store
            .set("book_bad2", r#"{"pages":["a"],"currentPage":5}"#)
            .unwrap();
        store.set("book_bad3", r#"{"pages":[],"currentPage":0}"#).unwrap();

        assert!(cache.load("bad1").is_none());
        assert!(cache.load("bad2").is_none());
        assert!(cache.load("bad3").is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path().join("cache")).unwrap();
        store.set("book_abc123", "first").unwrap();
        store.set("book_abc123", "second").unwrap();
        store.set("weird/key with spaces", "ok").unwrap();

        let reopened = FileStore::open(dir.path().join("cache")).unwrap();
        assert_eq!(reopened.get("book_abc123").as_deref(), Some("second"));
        assert_eq!(reopened.get("weird/key with spaces").as_deref(), Some("ok"));
        assert!(reopened.get("missing").is_none());
    }

    #[test]
    fn test_file_store_handles_very_long_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let id = "v".repeat(300);

        let cache = ContentCache::new(Arc::new(store.clone()));
        let content = BookContent::single("<p>Long id</p>");
        cache.store(&id, &content).unwrap();

        assert_eq!(cache.load(&id), Some(content));
        assert!(cache.load(&"v".repeat(299)).is_none());
    }

    #[test]
    fn test_file_store_concurrent_writers_of_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let values: Vec<String> = (0..8).map(|i| format!("value-{}", i)).collect();

        std::thread::scope(|scope| {
            for value in &values {
                let store = &store;
                scope.spawn(move || {
                    for _ in 0..20 {
                        store.set("book_shared", value).unwrap();
                    }
                });
            }
        });

        let last = store.get("book_shared").unwrap();
        assert!(values.contains(&last));

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_content_cache_over_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let content = BookContent::single("<p>About</p>");

        let cache = ContentCache::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        cache.store("vol-1", &content).unwrap();

        let reopened = ContentCache::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        assert!(reopened.contains("vol-1"));
        assert_eq!(reopened.load("vol-1"), Some(content));
    }

    #[test]
    fn test_viewability_parsing() {
        use folio::types::Viewability;

        assert!(Viewability::parse("ALL_PAGES").is_full());
        assert!(!Viewability::parse("PARTIAL").is_full());
        assert_eq!(
            Viewability::parse("SAMPLE"),
            Viewability::Unknown("SAMPLE".into())
        );
    }

    #[test]
    fn test_error_display() {
        let error = folio::Error::status(503, "http://books.test/v1/volumes");
        assert!(error.to_string().contains("503"));
        assert!(error.is_network());
        assert!(!error.is_parse());
    }
}
