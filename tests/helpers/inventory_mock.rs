//! Mock flight inventory API server
//!
//! Serves canned `/Search` responses shaped like the upstream flight API.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use EventLogistics::config::FlightInventoryConfig;

pub struct InventoryMockServer {
    pub server: MockServer,
}

impl InventoryMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Client settings pointing at this server
    pub fn config(&self) -> FlightInventoryConfig {
        FlightInventoryConfig {
            api_url: self.server.uri(),
            api_key: Some("test-key".to_string()),
            timeout_seconds: 1,
            requests_per_minute: 600,
            cache_ttl_seconds: 60,
        }
    }

    pub async fn mock_search(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/Search"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/Search"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_slow_search(&self, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/Search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(search_response(vec![]))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }
}

/// One direct flight in the upstream wire format
pub fn wire_result(index: &str, origin: &str, destination: &str, departs: &str, arrives: &str, fare: f64) -> Value {
    json!({
        "ResultIndex": index,
        "IsRefundable": false,
        "Fare": { "BaseFare": fare - 500.0, "Tax": 500.0, "PublishedFare": fare, "Currency": "INR" },
        "Segments": [[{
            "Airline": { "AirlineName": "Air India", "AirlineCode": "AI", "FlightNumber": "865" },
            "Origin": { "Airport": { "AirportCode": origin }, "DepTime": departs },
            "Destination": { "Airport": { "AirportCode": destination }, "ArrTime": arrives },
            "Duration": 75,
            "CabinClass": "Economy",
            "Baggage": "25 KG"
        }]]
    })
}

pub fn search_response(results: Vec<Value>) -> Value {
    json!({
        "Response": {
            "TraceId": "trace-mock",
            "Results": [results]
        }
    })
}
