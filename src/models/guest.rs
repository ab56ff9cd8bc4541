//! Guest model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A guest as supplied by the roster collaborator. Groups only ever hold the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub group_tag: Option<String>,
    pub departure_location: Option<String>,
}

impl Guest {
    pub fn new(email: &str, name: &str) -> Self {
        Self {
            email: email.to_string(),
            name: name.to_string(),
            phone: None,
            group_tag: None,
            departure_location: None,
        }
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.group_tag = Some(tag.to_string());
        self
    }

    pub fn with_departure(mut self, location: &str) -> Self {
        self.departure_location = Some(location.to_string());
        self
    }

    /// Email in the form used as membership key
    pub fn key(&self) -> String {
        crate::utils::helpers::normalize_email(&self.email)
    }

    /// Declared tag, ignoring blank values
    pub fn tag(&self) -> Option<&str> {
        self.group_tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Departure location, ignoring blank values
    pub fn departure(&self) -> Option<&str> {
        self.departure_location.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}

/// A completed hotel stay from the guest's booking history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastStay {
    pub hotel_id: Uuid,
    pub price_per_night: Option<f64>,
}
