use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, oneshot};

use nbu_rates::{Dispatch, FailureKind, PointKey, TaskError, TaskState};

use crate::common::{FakeSource, session};

#[tokio::test]
async fn rate_is_fetched_once_then_served_from_cache() {
    let src = Arc::new(FakeSource::default());
    let s = session(src.clone());

    let first = s.rate("USD").await.unwrap();
    assert_eq!(first.to_string(), "USD → UAH: 41.25");
    assert_eq!(src.point_calls(), 1);

    let second = s.rate("usd").await.unwrap();
    assert_eq!(second, first);
    assert_eq!(src.point_calls(), 1);

    let cached = s.request_rate("USD", |_| panic!("no callback on a hit"), |_| panic!("no callback on a hit"));
    assert!(matches!(cached, Ok(Dispatch::Cached(_))));
}

#[tokio::test]
async fn clear_forces_a_refetch() {
    let src = Arc::new(FakeSource::default());
    let s = session(src.clone());

    s.rate("EUR").await.unwrap();
    s.clear();
    assert!(s.cache().is_empty());
    s.rate("EUR").await.unwrap();
    assert_eq!(src.point_calls(), 2);
}

#[tokio::test]
async fn duplicate_request_is_rejected_while_running() {
    let gate = Arc::new(Semaphore::new(0));
    let src = Arc::new(FakeSource { gate: Some(gate.clone()), ..FakeSource::default() });
    let s = session(src.clone());

    let (tx, rx) = oneshot::channel();
    let first = s
        .request_rate("USD", move |r| { let _ = tx.send(r); }, |e| panic!("unexpected failure: {e}"))
        .unwrap();
    let Dispatch::Started(handle) = first else { panic!("expected a started task") };
    assert_eq!(s.state_of(PointKey::new("USD")), TaskState::Running);

    let second = s.request_rate("USD", |_| panic!("duplicate ran"), |_| panic!("duplicate ran"));
    let err = second.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Duplicate);
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("already in progress"));

    gate.add_permits(1);
    handle.finished().await;
    assert_eq!(rx.await.unwrap().rate, 41.2542);
    assert_eq!(s.state_of(PointKey::new("USD")), TaskState::Idle);
    assert_eq!(src.point_calls(), 1);
}

#[tokio::test]
async fn transport_failure_is_not_cached() {
    let src = Arc::new(FakeSource { broken: true, ..FakeSource::default() });
    let s = session(src.clone());

    let err = s.rate("USD").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
    assert!(err.is_retryable());
    assert!(err.to_string().starts_with("network error"));
    assert!(s.cache().is_empty());
    assert_eq!(s.state_of(PointKey::new("USD")), TaskState::Idle);

    // A retry is a fresh unit of work.
    let _ = s.rate("USD").await;
    assert_eq!(src.point_calls(), 2);
}

#[tokio::test]
async fn unpublished_rate_is_empty_data() {
    let s = session(Arc::new(FakeSource::default()));
    let err = s.rate("XXX").await.unwrap_err();
    assert!(matches!(err, TaskError::EmptyData(_)));
}

#[tokio::test(start_paused = true)]
async fn slow_rate_times_out() {
    let src = Arc::new(FakeSource { delay: Duration::from_secs(11), ..FakeSource::default() });
    let s = session(src);

    let err = s.rate("USD").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Timeout);
    assert!(s.cache().is_empty());
}

#[tokio::test]
async fn currency_codes_come_from_the_source() {
    let s = session(Arc::new(FakeSource::default()));
    let codes = s.currency_codes().await.unwrap();
    assert!(codes.contains("EUR"));
    assert!(!codes.contains("UAH"));
}
