//! Search controller tests: submission, failure surfacing and stale responses.

use folio::prelude::*;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::*;

fn controller(transport: &FakeTransport) -> SearchController {
    SearchController::new(Arc::new(catalog(transport)))
}

#[cfg(test)]
mod search_tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_query_is_ignored() {
        let transport = FakeTransport::new();
        transport.route(
            search_url("dune", 21),
            search_response(vec![volume("abc123", "Dune", "PARTIAL", None, None)]),
        );
        let search = controller(&transport);

        assert_eq!(search.submit("dune").await, SearchOutcome::Applied(1));
        let before = search.state();

        assert_eq!(search.submit("").await, SearchOutcome::Ignored);
        assert_eq!(search.submit("   \t").await, SearchOutcome::Ignored);

        assert_eq!(transport.request_count(), 1);
        assert_eq!(search.state(), before);
        assert_eq!(search.results()[0].id, "abc123");
    }

    #[tokio::test]
    async fn test_results_are_applied() {
        let transport = FakeTransport::new();
        transport.route(
            search_url("dune", 21),
            search_response(vec![
                volume("abc123", "Dune", "PARTIAL", None, None),
                volume("def456", "Dune Messiah", "ALL_PAGES", Some(10), None),
            ]),
        );
        let search = controller(&transport);

        assert_eq!(search.submit("  dune ").await, SearchOutcome::Applied(2));

        let state = search.state();
        assert_eq!(state.query, "dune");
        assert!(!state.loading);
        assert!(state.last_error.is_none());
        let ids: Vec<_> = state.results.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["abc123", "def456"]);
    }

    #[tokio::test]
    async fn test_no_matches_is_empty_not_failure() {
        let transport = FakeTransport::new();
        transport.route(search_url("zzzz", 21), r#"{"totalItems":0}"#);
        let search = controller(&transport);

        assert_eq!(search.submit("zzzz").await, SearchOutcome::Empty);
        assert!(search.results().is_empty());
        assert!(search.state().last_error.is_none());
    }

    #[tokio::test]
    async fn test_failure_clears_results_and_records_error() {
        let transport = FakeTransport::new();
        transport.route(
            search_url("dune", 21),
            search_response(vec![volume("abc123", "Dune", "PARTIAL", None, None)]),
        );
        transport.route_status(search_url("broken", 21), 500);
        let search = controller(&transport);

        search.submit("dune").await;
        assert_eq!(search.results().len(), 1);

        let outcome = search.submit("broken").await;
        assert!(matches!(outcome, SearchOutcome::Failed(_)));

        let state = search.state();
        assert!(state.results.is_empty());
        assert!(!state.loading);
        assert!(state.last_error.is_some());
    }

    #[tokio::test]
    async fn test_failure_does_not_expose_api_key() {
        let transport = FakeTransport::new();
        transport.route_status(format!("{}&key=SECRET123", search_url("dune", 21)), 403);
        let search = SearchController::new(Arc::new(
            catalog(&transport).with_api_key("SECRET123"),
        ));

        let outcome = search.submit("dune").await;
        let SearchOutcome::Failed(message) = outcome else {
            panic!("expected a failed search, got {:?}", outcome);
        };
        assert!(message.contains("403"));
        assert!(!message.contains("SECRET123"));

        let last_error = search.state().last_error.unwrap();
        assert!(last_error.contains("key=REDACTED"));
        assert!(!last_error.contains("SECRET123"));
    }

    #[tokio::test]
    async fn test_limit_is_capped() {
        let transport = FakeTransport::new();
        let search = controller(&transport).with_limit(100);

        search.submit("dune").await;

        assert_eq!(transport.requests(), vec![search_url("dune", 21)]);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let transport = FakeTransport::new();
        transport.route_delayed(
            search_url("slow", 21),
            search_response(vec![volume("slow1", "Slow", "PARTIAL", None, None)]),
            Duration::from_millis(150),
        );
        transport.route(
            search_url("fast", 21),
            search_response(vec![volume("fast1", "Fast", "PARTIAL", None, None)]),
        );
        let search = controller(&transport);

        let (first, second) = tokio::join!(search.submit("slow"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            search.submit("fast").await
        });

        assert_eq!(first, SearchOutcome::Superseded);
        assert_eq!(second, SearchOutcome::Applied(1));

        let state = search.state();
        assert_eq!(state.query, "fast");
        assert_eq!(state.results[0].id, "fast1");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_loading_flag_while_in_flight() {
        let transport = FakeTransport::new();
        transport.route_delayed(
            search_url("slow", 21),
            search_response(vec![]),
            Duration::from_millis(100),
        );
        let search = Arc::new(controller(&transport));

        let task = tokio::spawn({
            let search = search.clone();
            async move { search.submit("slow").await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(search.is_loading());

        assert_eq!(task.await.unwrap(), SearchOutcome::Empty);
        assert!(!search.is_loading());
    }

    #[tokio::test]
    async fn test_clear_abandons_in_flight_search() {
        let transport = FakeTransport::new();
        transport.route_delayed(
            search_url("slow", 21),
            search_response(vec![volume("slow1", "Slow", "PARTIAL", None, None)]),
            Duration::from_millis(100),
        );
        let search = controller(&transport);

        let (outcome, _) = tokio::join!(search.submit("slow"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            search.clear();
        });

        assert_eq!(outcome, SearchOutcome::Superseded);
        assert_eq!(search.state(), SearchState::default());
    }
}
