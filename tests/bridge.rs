use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use xdg_desktop_portal_amber::bridge::{
    Bridge, Cancel, Completion, Delivery, RequestState, Response,
};
use xdg_desktop_portal_amber::error::BridgeError;

type Uris = Vec<String>;

fn uris(items: &[&str]) -> Uris {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn completion_resolves_only_the_matching_request() {
    let bridge: Bridge<Uris> = Bridge::new("test");
    let first = bridge.subscribe("/org/x/request/A").unwrap();
    let second = bridge.subscribe("/org/x/request/B").unwrap();

    let delivery = bridge.complete(
        "/org/x/request/B",
        Completion::new(Response::Accepted, uris(&["file:///b"])),
    );
    assert_eq!(delivery, Delivery::Accepted);

    assert_eq!(
        bridge.state("/org/x/request/A"),
        Some(RequestState::Pending)
    );
    assert_eq!(
        bridge.state("/org/x/request/B"),
        Some(RequestState::Completed)
    );

    let completion = second.wait(Duration::from_secs(1)).await.unwrap();
    assert_eq!(completion.payload, uris(&["file:///b"]));

    drop(first);
    assert_eq!(bridge.pending_count(), 0);
}

#[tokio::test]
async fn unknown_token_is_dropped_without_side_effects() {
    let bridge: Bridge<Uris> = Bridge::new("test");
    let _pending = bridge.subscribe("/org/x/request/1").unwrap();

    let delivery = bridge.complete(
        "/org/x/request/999",
        Completion::new(Response::Accepted, uris(&["file:///stray"])),
    );

    assert_eq!(delivery, Delivery::Unmatched);
    assert_eq!(
        bridge.state("/org/x/request/1"),
        Some(RequestState::Pending)
    );
    assert_eq!(bridge.pending_count(), 1);
}

#[tokio::test]
async fn second_notification_does_not_overwrite_the_first() {
    let bridge: Bridge<Uris> = Bridge::new("test");
    let pending = bridge.subscribe("/t").unwrap();

    assert_eq!(
        bridge.complete("/t", Completion::new(Response::Accepted, uris(&["file:///first"]))),
        Delivery::Accepted
    );
    assert_eq!(
        bridge.complete("/t", Completion::new(Response::Cancelled, uris(&["file:///second"]))),
        Delivery::AlreadyCompleted
    );
    assert_eq!(bridge.state("/t"), Some(RequestState::Completed));

    let completion = pending.wait(Duration::from_secs(1)).await.unwrap();
    assert_eq!(completion.response, Response::Accepted);
    assert_eq!(completion.payload, uris(&["file:///first"]));
}

#[tokio::test(start_paused = true)]
async fn unanswered_request_times_out_and_is_released() {
    let bridge: Bridge<Uris> = Bridge::new("test");
    let budget = Duration::from_secs(30);
    let pending = bridge.subscribe("/t").unwrap();

    let start = Instant::now();
    let err = pending.wait(budget).await.unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err, BridgeError::Timeout(budget));
    assert!(elapsed >= budget);
    assert!(elapsed < budget + Duration::from_millis(250));
    assert_eq!(bridge.pending_count(), 0);

    let late = bridge.complete("/t", Completion::new(Response::Accepted, Vec::new()));
    assert_eq!(late, Delivery::Unmatched);
}

#[tokio::test(start_paused = true)]
async fn failed_dispatch_never_waits() {
    let bridge: Bridge<Uris> = Bridge::new("test");
    let start = Instant::now();

    let err = bridge
        .run(
            "/t",
            async { Err::<(), _>(BridgeError::DispatchFailed("ServiceUnknown".to_string())) },
            Duration::from_secs(60),
        )
        .await
        .unwrap_err();

    assert_eq!(err, BridgeError::DispatchFailed("ServiceUnknown".to_string()));
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(bridge.pending_count(), 0);
}

#[tokio::test]
async fn dispatch_runs_after_registration() {
    let bridge: Bridge<Uris> = Bridge::new("test");
    let listener = bridge.clone();

    // The delegate answers before its own acknowledgement returns.
    let completion = bridge
        .run(
            "/t",
            async move {
                let delivery = listener.complete(
                    "/t",
                    Completion::new(Response::Accepted, uris(&["file:///fast"])),
                );
                assert_eq!(delivery, Delivery::Accepted);
                Ok::<(), BridgeError>(())
            },
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(completion.payload, uris(&["file:///fast"]));
    assert_eq!(bridge.pending_count(), 0);
}

#[tokio::test]
async fn lost_ui_fails_every_waiting_request() {
    let bridge: Bridge<Uris> = Bridge::new("test");
    let first = bridge.subscribe("/org/x/request/A").unwrap();
    let second = bridge.subscribe("/org/x/request/B").unwrap();
    let done = bridge.subscribe("/org/x/request/C").unwrap();
    bridge.complete(
        "/org/x/request/C",
        Completion::new(Response::Accepted, uris(&["file:///c"])),
    );

    assert_eq!(bridge.fail_pending("UI process exited"), 2);
    assert_eq!(
        bridge.state("/org/x/request/A"),
        Some(RequestState::Failed)
    );
    assert_eq!(
        bridge.state("/org/x/request/C"),
        Some(RequestState::Completed)
    );

    for pending in [first, second] {
        let err = pending.wait(Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err, BridgeError::Failed("UI process exited".to_string()));
    }
    assert_eq!(done.wait(Duration::from_secs(1)).await.unwrap().payload, uris(&["file:///c"]));

    assert_eq!(bridge.fail_pending("UI process exited"), 0);
}

#[tokio::test]
async fn cancellation_ends_the_wait() {
    let bridge: Bridge<Uris> = Bridge::new("test");
    let pending = bridge.subscribe("/t").unwrap();

    let target: Arc<dyn Cancel> = Arc::new(bridge.clone());
    assert_eq!(target.cancel("/t"), Delivery::Accepted);
    assert_eq!(target.cancel("/t"), Delivery::AlreadyCompleted);

    let err = pending.wait(Duration::from_secs(1)).await.unwrap_err();
    assert_eq!(err, BridgeError::Cancelled);
    assert_eq!(target.cancel("/t"), Delivery::Unmatched);
}

#[test]
fn tokens_must_be_present_and_unique() {
    let bridge: Bridge<Uris> = Bridge::new("test");

    assert_eq!(bridge.subscribe("").err(), Some(BridgeError::InvalidToken));

    let pending = bridge.subscribe("/t").unwrap();
    assert_eq!(pending.token(), "/t");
    assert_eq!(
        bridge.subscribe("/t").err(),
        Some(BridgeError::DuplicateToken("/t".to_string()))
    );

    drop(pending);
    assert!(bridge.subscribe("/t").is_ok());
}
