//! Event model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of an event that grouping, scoring and flight configuration need
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventProfile {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub airport_code: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Accommodation budget per guest per night
    pub budget_per_guest: Option<f64>,
    pub event_type: Option<String>,
}
