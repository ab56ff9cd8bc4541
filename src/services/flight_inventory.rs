//! Flight inventory API client
//!
//! Talks to the external flight search API, normalizes its nested results
//! into `FlightOption`s and caches identical searches in Redis. Every failure
//! surfaces as a retryable `FlightInventoryError`.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FlightInventoryConfig;
use crate::models::{FareBreakdown, FlightOption, FlightSearchQuery};
use crate::services::collaborators::FlightInventory;
use crate::services::redis::RedisService;
use crate::utils::errors::{FlightInventoryError, LogisticsError, Result};
use crate::utils::logging::log_upstream_error;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SearchRequest<'a> {
    adult_count: String,
    journey_type: u8,
    segments: Vec<SearchSegment<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SearchSegment<'a> {
    origin: &'a str,
    destination: &'a str,
    flight_cabin_class: &'a str,
    preferred_departure_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchEnvelope {
    response: Option<SearchResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResponse {
    trace_id: Option<String>,
    #[serde(default)]
    results: Vec<Vec<WireResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireResult {
    result_index: String,
    #[serde(default)]
    is_refundable: bool,
    fare: Option<WireFare>,
    #[serde(default)]
    segments: Vec<Vec<WireSegment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireFare {
    #[serde(default)]
    base_fare: f64,
    #[serde(default)]
    tax: f64,
    #[serde(default)]
    published_fare: f64,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireSegment {
    airline: WireAirline,
    origin: WireEndpoint,
    destination: WireEndpoint,
    duration: Option<u32>,
    cabin_class: Option<String>,
    baggage: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireAirline {
    airline_name: String,
    airline_code: String,
    flight_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireEndpoint {
    airport: WireAirport,
    dep_time: Option<String>,
    arr_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireAirport {
    airport_code: String,
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP implementation of `FlightInventory`
pub struct HttpFlightInventory {
    client: Client,
    config: FlightInventoryConfig,
    limiter: DirectLimiter,
    cache: Option<RedisService>,
}

impl HttpFlightInventory {
    pub fn new(config: FlightInventoryConfig, cache: Option<RedisService>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("EventLogistics/1.0")
            .build()?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_minute(per_minute));

        Ok(Self {
            client,
            config,
            limiter,
            cache,
        })
    }

    async fn cached(&self, query: &FlightSearchQuery) -> Option<Vec<FlightOption>> {
        let cache = self.cache.as_ref()?;
        match cache.get_flight_search(query).await {
            Ok(hit) => hit,
            Err(e) => {
                // Cache trouble never fails a search
                warn!(error = %e, "Flight search cache read failed");
                None
            }
        }
    }

    async fn remember(&self, query: &FlightSearchQuery, options: &[FlightOption]) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache
                .cache_flight_search(query, options, self.config.cache_ttl_seconds)
                .await
            {
                warn!(error = %e, "Flight search cache write failed");
            }
        }
    }

    async fn request(&self, query: &FlightSearchQuery) -> Result<Vec<FlightOption>> {
        if self.limiter.check().is_err() {
            return Err(FlightInventoryError::RateLimited.into());
        }

        let url = format!("{}/Search", self.config.api_url.trim_end_matches('/'));
        let body = SearchRequest {
            adult_count: query.adults.to_string(),
            journey_type: 1,
            segments: vec![SearchSegment {
                origin: &query.origin,
                destination: &query.destination,
                flight_cabin_class: &query.cabin_class,
                preferred_departure_time: format!("{}T00:00:00", query.date),
            }],
        };

        debug!(url = %url, origin = %query.origin, destination = %query.destination, date = %query.date,
               "Making flight search request");

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            log_upstream_error("flight_inventory", &e.to_string(), Some(&query.cache_key()));
            if e.is_timeout() {
                LogisticsError::FlightInventory(FlightInventoryError::Timeout)
            } else if e.is_connect() {
                LogisticsError::FlightInventory(FlightInventoryError::ServiceUnavailable)
            } else {
                LogisticsError::FlightInventory(FlightInventoryError::RequestFailed(e.to_string()))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FlightInventoryError::RateLimited.into());
        }
        if status.is_server_error() {
            log_upstream_error("flight_inventory", &format!("HTTP {}", status), None);
            return Err(FlightInventoryError::ServiceUnavailable.into());
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FlightInventoryError::RequestFailed(format!("HTTP {}: {}", status, error_text)).into());
        }

        let envelope: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| FlightInventoryError::InvalidResponse(e.to_string()))?;

        let search = envelope
            .response
            .ok_or_else(|| FlightInventoryError::InvalidResponse("missing Response".to_string()))?;

        let options = search
            .results
            .into_iter()
            .flatten()
            .filter_map(|result| normalize_result(result, search.trace_id.as_deref(), query))
            .collect::<Vec<_>>();

        debug!(count = options.len(), "Flight search returned options");
        Ok(options)
    }
}

#[async_trait]
impl FlightInventory for HttpFlightInventory {
    async fn search_flights(&self, query: &FlightSearchQuery) -> Result<Vec<FlightOption>> {
        if let Some(options) = self.cached(query).await {
            debug!(key = %query.cache_key(), "Flight search served from cache");
            return Ok(options);
        }

        let options = self.request(query).await?;
        self.remember(query, &options).await;
        Ok(options)
    }
}

fn parse_wire_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Flatten one result into an option; results without a usable first segment are dropped
fn normalize_result(result: WireResult, trace_id: Option<&str>, query: &FlightSearchQuery) -> Option<FlightOption> {
    let leg = result.segments.into_iter().next()?;
    let stops = leg.len().saturating_sub(1) as u32;
    let first = leg.first()?;
    let last = leg.last()?;

    let departure_time = parse_wire_time(first.origin.dep_time.as_deref());
    let arrival_time = parse_wire_time(last.destination.arr_time.as_deref());
    let (departure_time, arrival_time) = match (departure_time, arrival_time) {
        (Some(d), Some(a)) => (d, a),
        _ => {
            warn!(result_index = %result.result_index, "Dropping flight result with unparseable schedule");
            return None;
        }
    };

    let fare = result.fare.map(|f| FareBreakdown {
        base_fare: f.base_fare,
        tax: f.tax,
        total_fare: f.published_fare,
        currency: f.currency.unwrap_or_else(|| "INR".to_string()),
    })?;

    Some(FlightOption {
        result_index: result.result_index,
        trace_id: trace_id.map(str::to_string),
        journey_type: query.journey_type,
        carrier: first.airline.airline_name.clone(),
        carrier_code: first.airline.airline_code.clone(),
        flight_number: first.airline.flight_number.clone(),
        origin: first.origin.airport.airport_code.clone(),
        destination: last.destination.airport.airport_code.clone(),
        departure_time,
        arrival_time,
        duration_minutes: leg.iter().map(|s| s.duration).sum::<Option<u32>>(),
        cabin_class: first.cabin_class.clone().unwrap_or_else(|| query.cabin_class.clone()),
        stops,
        baggage: first.baggage.clone(),
        refundable: result.is_refundable,
        fare,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JourneyType;
    use chrono::NaiveDate;

    #[test]
    fn test_normalize_multi_segment_result() {
        let raw = serde_json::json!({
            "ResultIndex": "OB12",
            "IsRefundable": true,
            "Fare": { "BaseFare": 4000.0, "Tax": 620.0, "PublishedFare": 4620.0, "Currency": "INR" },
            "Segments": [[
                {
                    "Airline": { "AirlineName": "IndiGo", "AirlineCode": "6E", "FlightNumber": "201" },
                    "Origin": { "Airport": { "AirportCode": "DEL" }, "DepTime": "2026-12-08T06:00:00" },
                    "Destination": { "Airport": { "AirportCode": "BOM" }, "ArrTime": "2026-12-08T08:10:00" },
                    "Duration": 130
                },
                {
                    "Airline": { "AirlineName": "IndiGo", "AirlineCode": "6E", "FlightNumber": "345" },
                    "Origin": { "Airport": { "AirportCode": "BOM" }, "DepTime": "2026-12-08T09:00:00" },
                    "Destination": { "Airport": { "AirportCode": "GOI" }, "ArrTime": "2026-12-08T10:05:00" },
                    "Duration": 65
                }
            ]]
        });
        let result: WireResult = serde_json::from_value(raw).unwrap();
        let query = FlightSearchQuery::economy(
            "DEL",
            "GOI",
            NaiveDate::from_ymd_opt(2026, 12, 8).unwrap(),
            JourneyType::Arrival,
        );

        let option = normalize_result(result, Some("trace-1"), &query).unwrap();
        assert_eq!(option.origin, "DEL");
        assert_eq!(option.destination, "GOI");
        assert_eq!(option.stops, 1);
        assert_eq!(option.duration_minutes, Some(195));
        assert_eq!(option.fare.total_fare, 4620.0);
        assert_eq!(option.trace_id.as_deref(), Some("trace-1"));
        assert!(option.refundable);
    }

    #[test]
    fn test_result_without_segments_is_dropped() {
        let raw = serde_json::json!({ "ResultIndex": "OB1", "Segments": [] });
        let result: WireResult = serde_json::from_value(raw).unwrap();
        let query = FlightSearchQuery::economy(
            "DEL",
            "GOI",
            NaiveDate::from_ymd_opt(2026, 12, 8).unwrap(),
            JourneyType::Arrival,
        );
        assert!(normalize_result(result, None, &query).is_none());
    }
}
