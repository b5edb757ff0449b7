use std::sync::Arc;
use std::time::Duration;

use nbu_rates::{Config, FailureKind, SeriesKey, TaskError, TaskState};

use crate::common::{FakeSource, days_ago, session, session_with, today};

#[tokio::test]
async fn two_gaps_in_thirty_days_still_forecast() {
    let src = Arc::new(FakeSource {
        missing: [days_ago(20), days_ago(7)].into_iter().collect(),
        ..FakeSource::default()
    });
    let s = session(src.clone());

    let out = s.series("USD", 30).await.unwrap();
    assert_eq!(out.series.len(), 28);
    assert_eq!(out.series.first().unwrap().date, days_ago(29));
    assert_eq!(out.series.last().unwrap().date, today());
    assert_eq!(src.day_calls(), 30);

    let forecast = out.forecast.unwrap();
    assert!(forecast.is_finite());
    assert!((forecast - 42.05).abs() < 1e-6, "forecast {forecast}");

    // Served from cache the second time.
    let again = s.series("USD", 30).await.unwrap();
    assert_eq!(again, out);
    assert_eq!(src.day_calls(), 30);
}

#[tokio::test]
async fn three_missing_in_a_row_fails_validation() {
    let src = Arc::new(FakeSource {
        missing: [days_ago(12), days_ago(11), days_ago(10)].into_iter().collect(),
        ..FakeSource::default()
    });
    let s = session(src);

    let err = s.series("USD", 30).await.unwrap_err();
    assert!(matches!(err, TaskError::Validation(_)));
    assert!(err.to_string().contains("too many consecutive missing values"), "{err}");
    assert!(s.cache().is_empty());
    assert_eq!(s.state_of(SeriesKey::new("USD", 30)), TaskState::Idle);
}

#[tokio::test]
async fn zero_rates_count_as_missing() {
    let src = Arc::new(FakeSource {
        zero: [days_ago(3), days_ago(2), days_ago(1)].into_iter().collect(),
        ..FakeSource::default()
    });
    let err = session(src).series("EUR", 30).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Validation);
}

#[tokio::test]
async fn windows_are_separate_keys() {
    let src = Arc::new(FakeSource::default());
    let s = session(src.clone());

    let month = s.series("USD", 30).await.unwrap();
    let quarter = s.series("USD", 90).await.unwrap();
    assert_eq!(month.series.len(), 30);
    assert_eq!(quarter.series.len(), 90);
    assert_eq!(src.day_calls(), 120);
    assert_eq!(s.cache().len(), 2);
}

#[tokio::test]
async fn parallel_fetch_matches_sequential() {
    let sequential = session(Arc::new(FakeSource::default())).series("PLN", 30).await.unwrap();

    let cfg = Config { fetch_concurrency: 6, ..Config::default() };
    let parallel = session_with(cfg, Arc::new(FakeSource::default()))
        .series("PLN", 30)
        .await
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[tokio::test]
async fn only_transport_failures_is_a_network_error() {
    let src = Arc::new(FakeSource { broken: true, ..FakeSource::default() });
    let err = session(src).series("USD", 30).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[tokio::test]
async fn no_rates_at_all_is_empty_data() {
    let src = Arc::new(FakeSource {
        missing: (0..30).map(days_ago).collect(),
        ..FakeSource::default()
    });
    let err = session(src).series("USD", 30).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::EmptyData);
}

#[tokio::test]
async fn forecast_off_still_returns_series() {
    let cfg = Config { forecast: false, ..Config::default() };
    let out = session_with(cfg, Arc::new(FakeSource::default()))
        .series("USD", 30)
        .await
        .unwrap();
    assert_eq!(out.series.len(), 30);
    assert_eq!(out.forecast, None);
}

#[tokio::test(start_paused = true)]
async fn slow_series_times_out() {
    let src = Arc::new(FakeSource { delay: Duration::from_secs(2), ..FakeSource::default() });
    let s = session(src.clone());

    let err = s.series("USD", 30).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Timeout);
    assert_eq!(src.day_calls(), 30);
    assert!(s.cache().is_empty());
}

#[tokio::test]
async fn short_window_with_a_gap_has_too_few_points() {
    let src = Arc::new(FakeSource {
        missing: [days_ago(2)].into_iter().collect(),
        ..FakeSource::default()
    });
    let s = session(src);

    let err = s.series("USD", 5).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Validation);
    assert!(err.to_string().contains("not enough points (4 < 5)"), "{err}");
    assert!(s.cache().is_empty());
}
