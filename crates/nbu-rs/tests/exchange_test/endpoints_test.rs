use crate::common::setup_client;
use chrono::{Duration, Local};
use std::time::Duration as StdDuration;
use tokio::time::sleep;
/// =============================================================================
/// LIVE DIRECTORY TESTS (network; run with `cargo test -- --ignored`)
/// =============================================================================
#[tokio::test]
#[ignore]
async fn test_get_exchange() {
    let client = setup_client();
    let result = client.get_exchange().await;
    assert!(result.is_ok(), "Failed to get exchange: {:?}", result.err());
    let records = result.unwrap();
    println!("Published currencies: {}", records.len());
    assert!(!records.is_empty());
}
#[tokio::test]
#[ignore]
async fn test_get_exchange_for_usd() {
    let client = setup_client();
    let records = client.get_exchange_for("USD").await.expect("Failed to get USD");
    let usd = records.first().expect("USD not published");
    println!("USD: {}", usd);
    assert_eq!(usd.cc, "USD");
    assert!(usd.rate.unwrap_or(0.0) > 0.0);
}
#[tokio::test]
#[ignore]
async fn test_get_exchange_on_past_date() {
    let client = setup_client();
    let day = Local::now().date_naive() - Duration::days(7);
    let records = client.get_exchange_on("EUR", day).await.expect("Failed to get EUR");
    println!("EUR on {}: {:?}", day, records.first());
    assert!(records.iter().all(| r | r.cc == "EUR"));
}
#[tokio::test]
#[ignore]
async fn test_symbols_and_current_rates() {
    let client = setup_client();
    let symbols = client.get_symbols().await.expect("Failed to get symbols");
    assert!(!symbols.contains("UAH"));
    sleep(StdDuration::from_secs(1)).await;
    let rates = client
        .get_current_rates(&["USD", "EUR"])
        .await
        .expect("Failed to get current rates");
    println!("Current rates: {:?}", rates);
    assert!(rates.contains_key("USD"));
}
