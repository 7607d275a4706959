//! Flight Module Tests
//!
//! ## Test Scopes
//! - **Collapsing**: N concurrent calls run the work once and share one result.
//! - **Failure Sharing**: Errors reach every joiner and do not stick.
//! - **Leader Loss**: Work outlives a cancelled leader; only a panic hands over to a joiner.

#[cfg(test)]
mod tests {
    use crate::flight::FlightGroup;
    use futures::future::join_all;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_single_call_runs_work() {
        let group: FlightGroup<String> = FlightGroup::new();
        let value = group.call("key", || async { "bar".to_string() }).await;

        assert_eq!(value, "bar");
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_calls_collapse_into_one() {
        let group: FlightGroup<Result<String, String>> = FlightGroup::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let futures = (0..10).map(|_| {
            let calls = calls.clone();
            group.call("x", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, String>("done".to_string())
            })
        });
        let results = join_all(futures).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r == &Ok("done".to_string())));
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_collapsing_across_tasks() {
        let group: Arc<FlightGroup<usize>> = Arc::new(FlightGroup::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..16 {
            let group = group.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                group
                    .call_shared("x", || async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        n + 41
                    })
                    .await
            }));
        }

        let mut shared = 0;
        for handle in handles {
            let (value, was_shared) = handle.await.unwrap();
            assert_eq!(value, 41);
            if was_shared {
                shared += 1;
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(shared, 15);
    }

    #[tokio::test]
    async fn test_errors_are_shared_and_not_cached() {
        let group: FlightGroup<Result<u32, String>> = FlightGroup::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let futures = (0..5).map(|_| {
            let calls = calls.clone();
            group.call("bad", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err::<u32, _>("source down".to_string())
            })
        });
        let results = join_all(futures).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r == &Err("source down".to_string())));

        // The window closed, so the next call runs again
        let retry = group.call("bad", || async { Ok(7) }).await;
        assert_eq!(retry, Ok(7));
    }

    #[tokio::test]
    async fn test_sequential_calls_each_execute() {
        let group: FlightGroup<usize> = FlightGroup::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            group
                .call("k", move || async move { calls.fetch_add(1, Ordering::SeqCst) })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block_each_other() {
        let group: FlightGroup<&'static str> = FlightGroup::new();

        let (a, b) = tokio::join!(
            group.call("a", || async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                "a"
            }),
            group.call("b", || async { "b" }),
        );

        assert_eq!((a, b), ("a", "b"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_aborted_leader_still_completes_for_joiner() {
        let group: Arc<FlightGroup<u32>> = Arc::new(FlightGroup::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let leader = {
            let group = group.clone();
            let runs = runs.clone();
            tokio::spawn(async move {
                group
                    .call("slow", move || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        1
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(group.in_flight(), 1);

        let joiner = {
            let group = group.clone();
            let runs = runs.clone();
            tokio::spawn(async move {
                group
                    .call_shared("slow", move || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        2
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        leader.abort();

        let (value, shared) = tokio::time::timeout(Duration::from_secs(5), joiner)
            .await
            .expect("joiner should not hang")
            .unwrap();
        assert_eq!(value, 1, "the aborted leader's result reaches the joiner");
        assert!(shared);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(group.in_flight(), 0);
    }

    fn explode() -> u32 {
        panic!("loader blew up")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_work_hands_over_to_joiner() {
        let group: Arc<FlightGroup<u32>> = Arc::new(FlightGroup::new());

        let leader = {
            let group = group.clone();
            tokio::spawn(async move {
                group
                    .call("boom", || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        explode()
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;

        let joiner = {
            let group = group.clone();
            tokio::spawn(async move { group.call("boom", || async { 2 }).await })
        };

        let value = tokio::time::timeout(Duration::from_secs(5), joiner)
            .await
            .expect("joiner should not hang")
            .unwrap();
        assert_eq!(value, 2);
        assert!(leader.await.unwrap_err().is_panic());
        assert_eq!(group.in_flight(), 0);
    }
}
