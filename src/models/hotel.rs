//! Hotel catalog model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn average(&self) -> f64 {
        (self.min + self.max.unwrap_or(self.min)) / 2.0
    }
}

/// Price band a nightly rate falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Budget,
    MidRange,
    Luxury,
}

impl PriceTier {
    pub fn from_nightly_rate(rate: f64) -> Self {
        if rate < 3000.0 {
            PriceTier::Budget
        } else if rate < 8000.0 {
            PriceTier::MidRange
        } else {
            PriceTier::Luxury
        }
    }

    /// 0 for the same band, 1 for neighbours, 2 for budget vs luxury
    pub fn distance(self, other: PriceTier) -> u8 {
        (self as i8 - other as i8).unsigned_abs()
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceTier::Budget => write!(f, "budget"),
            PriceTier::MidRange => write!(f, "mid-range"),
            PriceTier::Luxury => write!(f, "luxury"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelLocation {
    pub city: Option<String>,
    pub country: Option<String>,
}

/// A hotel the planner selected for the event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub price_range: Option<PriceRange>,
    pub facilities: Vec<String>,
    pub specializations: Vec<String>,
    pub total_rooms: Option<u32>,
    pub location: HotelLocation,
}
