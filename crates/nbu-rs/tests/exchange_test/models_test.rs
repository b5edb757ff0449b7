use chrono::NaiveDate;
use nbu_rs::exchange::endpoints::{parse_records, rates_for, symbols_from};
use nbu_rs::exchange::models::*;

const SAMPLE: &str = r#"[
    {"r030":840,"txt":"Долар США","rate":41.2542,"cc":"USD","exchangedate":"14.10.2026"},
    {"r030":978,"txt":"Євро","rate":47.9013,"cc":"EUR","exchangedate":"14.10.2026"},
    {"r030":980,"txt":"Гривня","rate":1.0,"cc":"UAH","exchangedate":"14.10.2026"},
    {"r030":985,"txt":"Злотий","cc":"PLN","exchangedate":"14.10.2026"}
]"#;

#[test]
fn test_exchange_record_deserialization() {
    let json = r#"[{"r030":840,"txt":"Долар США","rate":41.2542,"cc":"USD","exchangedate":"14.10.2026"}]"#;
    let records: Vec<ExchangeRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cc, "USD");
    assert_eq!(records[0].rate, Some(41.2542));
    assert_eq!(records[0].date(), NaiveDate::from_ymd_opt(2026, 10, 14));
}

#[test]
fn test_missing_rate_is_none() {
    let records = parse_records(SAMPLE).unwrap();
    let pln = records.iter().find(|r| r.cc == "PLN").unwrap();
    assert_eq!(pln.rate, None);
    assert_eq!(pln.to_string(), "PLN - (14.10.2026)");
}

#[test]
fn test_blank_body_is_empty_list() {
    assert!(parse_records("").unwrap().is_empty());
    assert!(parse_records("[]").unwrap().is_empty());
}

#[test]
fn test_malformed_body_is_parse_error() {
    let err = parse_records("<html>busy</html>").unwrap_err();
    assert!(matches!(err, nbu_rs::NbuError::ParseError(_)));
}

#[test]
fn test_symbols_exclude_uah() {
    let records = parse_records(SAMPLE).unwrap();
    let symbols = symbols_from(&records);
    assert!(symbols.contains("USD"));
    assert!(symbols.contains("PLN"));
    assert!(!symbols.contains("UAH"));
}

#[test]
fn test_rates_for_filters_codes_and_gaps() {
    let records = parse_records(SAMPLE).unwrap();
    let rates = rates_for(&records, &["USD", "PLN", "GBP"]);
    assert_eq!(rates.len(), 1);
    assert_eq!(rates.get("USD"), Some(&41.2542));
}

#[test]
fn test_query_serialization() {
    let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let q = serde_urlencoded::to_string(ExchangeQuery::on_date("EUR", day)).unwrap();
    assert_eq!(q, "valcode=EUR&date=20240301");
    let empty = serde_urlencoded::to_string(ExchangeQuery::default()).unwrap();
    assert!(empty.is_empty());
}
