use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::sync::Notify;
use tokio::time;
use workdeck_bridge::BridgeError;
use workdeck_query::{KeyPrefix, QueryClient, QueryKey, QueryOptions, NEVER};

type BoxedFetch = Pin<Box<dyn Future<Output = Result<Value, BridgeError>> + Send>>;

fn task_page_key(workspace: &str, include_closed: bool) -> QueryKey {
    QueryKey::new("clickup.tasks")
        .param(workspace)
        .param(include_closed)
}

/// Fetcher that sleeps briefly, then resolves to the 1-based call count.
fn counting_fetcher(
    counter: Arc<AtomicUsize>,
    delay: Duration,
) -> impl Fn() -> BoxedFetch + Send + Sync + 'static {
    move || {
        let counter = Arc::clone(&counter);
        Box::pin(async move {
            time::sleep(delay).await;
            let calls = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!(calls))
        })
    }
}

#[tokio::test]
async fn concurrent_equal_keys_share_one_fetch() {
    let client = QueryClient::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let key = task_page_key("ws123", false);

    let (first, second) = tokio::join!(
        client.query(
            key.clone(),
            QueryOptions::default(),
            counting_fetcher(Arc::clone(&counter), Duration::from_millis(20)),
        ),
        client.query(
            key.clone(),
            QueryOptions::default(),
            counting_fetcher(Arc::clone(&counter), Duration::from_millis(20)),
        ),
    );

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(first.data, Some(json!(1)));
    assert_eq!(second.data, Some(json!(1)));
}

#[tokio::test]
async fn changing_one_parameter_produces_a_distinct_entry() {
    let client = QueryClient::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let open = client
        .query(
            task_page_key("ws123", false),
            QueryOptions::default(),
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;
    let with_closed = client
        .query(
            task_page_key("ws123", true),
            QueryOptions::default(),
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;

    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(open.data, Some(json!(1)));
    assert_eq!(with_closed.data, Some(json!(2)));
    assert_eq!(client.len(), 2);
}

#[tokio::test]
async fn disabled_query_is_idle_and_never_fetches() {
    // Missing required parameter (no workspace selected yet): the guard
    // disables the query and the consumer sees absence, not an error.
    let client = QueryClient::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let snapshot = client
        .query(
            task_page_key("", false),
            QueryOptions::default().enabled(false),
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;

    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(snapshot.data, None);
    assert_eq!(snapshot.error, None);
    assert!(!snapshot.is_loading);
    assert!(!snapshot.is_fetching);
}

#[tokio::test]
async fn fresh_value_is_served_without_a_second_fetch() {
    let client = QueryClient::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let key = task_page_key("ws123", false);
    let options = QueryOptions::default().stale_time(Duration::from_secs(60));

    let first = client
        .query(
            key.clone(),
            options,
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;
    let second = client
        .query(
            key.clone(),
            options,
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(first.data, Some(json!(1)));
    assert_eq!(second.data, Some(json!(1)));
    assert!(!second.is_fetching);
}

#[tokio::test]
async fn stale_value_is_served_while_revalidating() {
    let client = QueryClient::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let key = task_page_key("ws123", false);
    let options = QueryOptions::default().stale_time(Duration::ZERO);

    let first = client
        .query(
            key.clone(),
            options,
            counting_fetcher(Arc::clone(&counter), Duration::from_millis(10)),
        )
        .await;
    assert_eq!(first.data, Some(json!(1)));

    // Stale hit: the old value comes back immediately, no loading spinner,
    // with one background refetch in flight.
    let second = client
        .query(
            key.clone(),
            options,
            counting_fetcher(Arc::clone(&counter), Duration::from_millis(10)),
        )
        .await;
    assert_eq!(second.data, Some(json!(1)));
    assert!(!second.is_loading);
    assert!(second.is_fetching);

    time::sleep(Duration::from_millis(60)).await;
    let settled = client.peek(&key);
    assert_eq!(settled.data, Some(json!(2)));
    assert!(!settled.is_fetching);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn retryable_failure_is_retried_once_then_succeeds() {
    let client = QueryClient::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let fetcher = {
        let attempts = Arc::clone(&attempts);
        move || -> BoxedFetch {
            let attempts = Arc::clone(&attempts);
            Box::pin(async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(BridgeError::Transport("socket closed".to_owned()))
                } else {
                    Ok(json!("recovered"))
                }
            })
        }
    };

    let snapshot = client
        .query(
            task_page_key("ws123", false),
            QueryOptions::default().retry(1),
            fetcher,
        )
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(snapshot.data, Some(json!("recovered")));
    assert_eq!(snapshot.error, None);
}

#[tokio::test]
async fn retry_zero_surfaces_the_first_error() {
    let client = QueryClient::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let fetcher = {
        let attempts = Arc::clone(&attempts);
        move || -> BoxedFetch {
            let attempts = Arc::clone(&attempts);
            Box::pin(async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(BridgeError::Transport("socket closed".to_owned()))
            })
        }
    };

    let snapshot = client
        .query(
            task_page_key("ws123", false),
            QueryOptions::default().retry(0),
            fetcher,
        )
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(snapshot.data, None);
    assert_eq!(
        snapshot.error,
        Some(BridgeError::Transport("socket closed".to_owned()))
    );
    assert!(!snapshot.is_loading);
    assert!(!snapshot.is_fetching);
}

#[tokio::test]
async fn non_retryable_failures_are_not_retried() {
    let client = QueryClient::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let fetcher = {
        let attempts = Arc::clone(&attempts);
        move || -> BoxedFetch {
            let attempts = Arc::clone(&attempts);
            Box::pin(async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(BridgeError::AuthRequired("sign in first".to_owned()))
            })
        }
    };

    let snapshot = client
        .query(
            task_page_key("ws123", false),
            QueryOptions::default().retry(1),
            fetcher,
        )
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(matches!(snapshot.error, Some(BridgeError::AuthRequired(_))));
}

#[tokio::test]
async fn invalidated_prefix_revalidates_on_next_access() {
    let client = QueryClient::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let key = task_page_key("ws123", false);
    let options = QueryOptions::default().stale_time(NEVER);

    client
        .query(
            key.clone(),
            options,
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;
    client.invalidate_prefix(&KeyPrefix::kind("clickup"));

    let after = client
        .query(
            key.clone(),
            options,
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;
    // Stale-while-revalidate: the old value is still shown during the
    // forced refetch.
    assert_eq!(after.data, Some(json!(1)));
    assert!(after.is_fetching);

    time::sleep(Duration::from_millis(40)).await;
    assert_eq!(client.peek(&key).data, Some(json!(2)));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unrelated_prefix_is_untouched_by_invalidation() {
    let client = QueryClient::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let key = task_page_key("ws123", false);
    let options = QueryOptions::default().stale_time(NEVER);

    client
        .query(
            key.clone(),
            options,
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;
    client.invalidate_prefix(&KeyPrefix::kind("github"));

    let after = client
        .query(
            key.clone(),
            options,
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(!after.is_fetching);
}

#[tokio::test]
async fn remove_prefix_evicts_entries() {
    let client = QueryClient::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let key = task_page_key("ws123", false);

    client
        .query(
            key.clone(),
            QueryOptions::default(),
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;
    assert_eq!(client.len(), 1);

    client.remove_prefix(&KeyPrefix::kind("clickup.tasks"));
    assert!(client.is_empty());
    assert_eq!(client.peek(&key).data, None);
}

#[tokio::test]
async fn sweep_evicts_only_entries_past_their_collection_window() {
    let client = QueryClient::new();
    let counter = Arc::new(AtomicUsize::new(0));

    client
        .query(
            task_page_key("ws123", false),
            QueryOptions::default().gc_time(Duration::ZERO),
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;
    client
        .query(
            QueryKey::new("clickup.authorized_user"),
            QueryOptions::default().gc_time(NEVER),
            counting_fetcher(Arc::clone(&counter), Duration::ZERO),
        )
        .await;

    let evicted = client.sweep(Instant::now());
    assert_eq!(evicted, 1);
    assert_eq!(client.len(), 1);
    assert!(client.peek(&QueryKey::new("clickup.authorized_user")).data.is_some());
}

#[tokio::test]
async fn superseding_refetch_wins_over_a_slower_in_flight_fetch() {
    let client = QueryClient::new();
    let key = task_page_key("ws123", false);
    let gate = Arc::new(Notify::new());

    let slow_fetcher = {
        let gate = Arc::clone(&gate);
        move || -> BoxedFetch {
            let gate = Arc::clone(&gate);
            Box::pin(async move {
                gate.notified().await;
                Ok(json!("old"))
            })
        }
    };
    let first = {
        let client = client.clone();
        let key = key.clone();
        tokio::spawn(async move {
            client
                .query(key, QueryOptions::default(), slow_fetcher)
                .await
        })
    };
    time::sleep(Duration::from_millis(10)).await;

    let refetched = client
        .refetch(key.clone(), QueryOptions::default(), move || -> BoxedFetch {
            Box::pin(async move { Ok(json!("new")) })
        })
        .await;
    assert_eq!(refetched.data, Some(json!("new")));

    // The slower, superseded response must be dropped, not applied.
    gate.notify_one();
    time::sleep(Duration::from_millis(10)).await;
    assert_eq!(client.peek(&key).data, Some(json!("new")));

    let joined = first.await.expect("first query task should not panic");
    assert_eq!(joined.data, Some(json!("new")));
}

#[tokio::test]
async fn loading_is_reported_only_before_the_first_value() {
    let client = QueryClient::new();
    let key = task_page_key("ws123", false);
    let gate = Arc::new(Notify::new());

    let gated_fetcher = {
        let gate = Arc::clone(&gate);
        move || -> BoxedFetch {
            let gate = Arc::clone(&gate);
            Box::pin(async move {
                gate.notified().await;
                Ok(json!({ "tasks": [], "lastPage": true }))
            })
        }
    };
    let pending = {
        let client = client.clone();
        let key = key.clone();
        tokio::spawn(async move {
            client
                .query(key, QueryOptions::default(), gated_fetcher)
                .await
        })
    };
    time::sleep(Duration::from_millis(10)).await;

    let in_flight = client.peek(&key);
    assert!(in_flight.is_loading);
    assert!(in_flight.is_fetching);
    assert_eq!(in_flight.data, None);

    gate.notify_one();
    let resolved = pending.await.expect("query task should not panic");
    assert!(!resolved.is_loading);
    assert_eq!(resolved.data, Some(json!({ "tasks": [], "lastPage": true })));
}

#[tokio::test]
async fn snapshot_decode_maps_payloads_and_reports_mismatches() {
    let client = QueryClient::new();
    let key = QueryKey::new("clickup.task_count");
    let snapshot = client
        .query(key, QueryOptions::default(), move || -> BoxedFetch {
            Box::pin(async move { Ok(json!(7)) })
        })
        .await;

    let count: Option<u64> = snapshot
        .decode("clickup.task_count")
        .expect("numeric payload should decode");
    assert_eq!(count, Some(7));

    let mismatch = snapshot.decode::<Vec<String>>("clickup.task_count");
    assert!(matches!(mismatch, Err(BridgeError::Decode { .. })));
}
