//! HTTP flight inventory client against a mock API

mod helpers;

use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{NaiveDate, TimeZone, Utc};
use helpers::*;
use serde_json::json;

use EventLogistics::models::{FlightSearchQuery, JourneyType};
use EventLogistics::services::{FlightInventory, HttpFlightInventory};
use EventLogistics::utils::{FlightInventoryError, LogisticsError};

fn arrival_query() -> FlightSearchQuery {
    FlightSearchQuery::economy(
        "BOM",
        "GOI",
        NaiveDate::from_ymd_opt(2026, 12, 9).unwrap(),
        JourneyType::Arrival,
    )
}

#[tokio::test]
async fn test_search_normalizes_results() {
    let mock = InventoryMockServer::new().await;
    let mut without_fare = wire_result("OB3", "BOM", "GOI", "2026-12-09T12:00:00", "2026-12-09T13:15:00", 0.0);
    without_fare.as_object_mut().unwrap().remove("Fare");
    mock.mock_search(search_response(vec![
        wire_result("OB1", "BOM", "GOI", "2026-12-09T06:00:00", "2026-12-09T07:15:00", 4200.0),
        wire_result("OB2", "BOM", "GOI", "2026-12-09T09:30:00+05:30", "2026-12-09T10:45:00+05:30", 5100.0),
        without_fare,
    ]))
    .await;

    let inventory = HttpFlightInventory::new(mock.config(), None).unwrap();
    let options = inventory.search_flights(&arrival_query()).await.unwrap();

    assert_eq!(options.len(), 2);
    let first = &options[0];
    assert_eq!(first.result_index, "OB1");
    assert_eq!(first.trace_id.as_deref(), Some("trace-mock"));
    assert_eq!(first.journey_type, JourneyType::Arrival);
    assert_eq!(first.carrier_code, "AI");
    assert_eq!(first.origin, "BOM");
    assert_eq!(first.destination, "GOI");
    assert_eq!(first.stops, 0);
    assert_eq!(first.duration_minutes, Some(75));
    assert_eq!(first.fare.total_fare, 4200.0);
    assert_eq!(first.departure_time, Utc.with_ymd_and_hms(2026, 12, 9, 6, 0, 0).unwrap());

    // Offsets are converted to UTC
    assert_eq!(options[1].departure_time, Utc.with_ymd_and_hms(2026, 12, 9, 4, 0, 0).unwrap());
}

#[tokio::test]
async fn test_server_error_is_service_unavailable() {
    let mock = InventoryMockServer::new().await;
    mock.mock_status(500).await;

    let inventory = HttpFlightInventory::new(mock.config(), None).unwrap();
    let err = inventory.search_flights(&arrival_query()).await.unwrap_err();
    assert_matches!(err, LogisticsError::FlightInventory(FlightInventoryError::ServiceUnavailable));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_throttled_upstream_is_rate_limited() {
    let mock = InventoryMockServer::new().await;
    mock.mock_status(429).await;

    let inventory = HttpFlightInventory::new(mock.config(), None).unwrap();
    let err = inventory.search_flights(&arrival_query()).await.unwrap_err();
    assert_matches!(err, LogisticsError::FlightInventory(FlightInventoryError::RateLimited));
}

#[tokio::test]
async fn test_local_quota_rejects_excess_searches() {
    let mock = InventoryMockServer::new().await;
    mock.mock_search(search_response(vec![])).await;

    let mut config = mock.config();
    config.requests_per_minute = 1;
    let inventory = HttpFlightInventory::new(config, None).unwrap();

    assert!(inventory.search_flights(&arrival_query()).await.unwrap().is_empty());
    let err = inventory.search_flights(&arrival_query()).await.unwrap_err();
    assert_matches!(err, LogisticsError::FlightInventory(FlightInventoryError::RateLimited));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let mock = InventoryMockServer::new().await;
    mock.mock_slow_search(Duration::from_secs(3)).await;

    let inventory = HttpFlightInventory::new(mock.config(), None).unwrap();
    let err = inventory.search_flights(&arrival_query()).await.unwrap_err();
    assert_matches!(err, LogisticsError::FlightInventory(FlightInventoryError::Timeout));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_missing_response_body_is_invalid() {
    let mock = InventoryMockServer::new().await;
    mock.mock_search(json!({ "Error": { "ErrorMessage": "No result found" } })).await;

    let inventory = HttpFlightInventory::new(mock.config(), None).unwrap();
    let err = inventory.search_flights(&arrival_query()).await.unwrap_err();
    assert_matches!(err, LogisticsError::FlightInventory(FlightInventoryError::InvalidResponse(_)));
}
