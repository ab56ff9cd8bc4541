//! Flight models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyType {
    /// Guest origin to the event
    Arrival,
    /// Event back to the guest origin
    Departure,
}

impl JourneyType {
    pub fn all() -> [JourneyType; 2] {
        [JourneyType::Arrival, JourneyType::Departure]
    }
}

impl std::fmt::Display for JourneyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JourneyType::Arrival => write!(f, "arrival"),
            JourneyType::Departure => write!(f, "departure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base_fare: f64,
    pub tax: f64,
    pub total_fare: f64,
    pub currency: String,
}

/// One bookable option returned by the flight inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOption {
    pub result_index: String,
    pub trace_id: Option<String>,
    pub journey_type: JourneyType,
    pub carrier: String,
    pub carrier_code: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub cabin_class: String,
    pub stops: u32,
    pub baggage: Option<String>,
    pub refundable: bool,
    pub fare: FareBreakdown,
}

/// Snapshot of the options staff picked for one (group, journey) pair.
/// Later catalog changes never alter it; a new selection replaces it whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSelection {
    pub group_name: String,
    pub journey_type: JourneyType,
    pub origin: String,
    pub destination: String,
    pub options: Vec<FlightOption>,
    pub selected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSearchQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub journey_type: JourneyType,
    pub adults: u32,
    pub cabin_class: String,
}

impl FlightSearchQuery {
    pub fn economy(origin: &str, destination: &str, date: NaiveDate, journey_type: JourneyType) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date,
            journey_type,
            adults: 1,
            cabin_class: "Economy".to_string(),
        }
    }

    /// Stable key for caching identical searches
    pub fn cache_key(&self) -> String {
        format!(
            "flights:{}:{}:{}:{}:{}:{}",
            self.origin, self.destination, self.date, self.journey_type, self.adults, self.cabin_class
        )
    }
}

/// What a guest sees once the configuration is published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedFlights {
    pub group_name: String,
    pub origin: String,
    pub destination: String,
    pub arrival: Vec<FlightOption>,
    pub departure: Vec<FlightOption>,
}
