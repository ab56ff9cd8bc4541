//! Per-event configuration document
//!
//! The aggregate root every mutating operation works on. One document per
//! event; it is reloaded, mutated and saved as a whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::EventProfile;
use super::group::{AirportCode, Group, LocationGroup, Membership, SearchWindow};
use crate::utils::errors::{LogisticsError, PublishBlocker, Result};
use crate::utils::helpers::group_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationStatus {
    /// No location group configured yet
    Draft,
    InProgress,
    /// Every location group configured but not published
    Completed,
    Published,
}

impl std::fmt::Display for ConfigurationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationStatus::Draft => write!(f, "draft"),
            ConfigurationStatus::InProgress => write!(f, "in-progress"),
            ConfigurationStatus::Completed => write!(f, "completed"),
            ConfigurationStatus::Published => write!(f, "published"),
        }
    }
}

/// Derived counters, recomputed after every mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationStats {
    pub total_groups: usize,
    pub configured_groups: usize,
    pub total_guests: usize,
    pub empty_groups: usize,
    pub accommodation_groups: usize,
    pub completion_percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub event_id: Uuid,
    /// Bumped by the store on every successful save
    pub version: i64,
    pub event_airport_code: AirportCode,
    pub event_city: Option<String>,
    pub search_window: SearchWindow,
    pub groups: Vec<Group>,
    pub location_groups: Vec<LocationGroup>,
    pub stats: ConfigurationStats,
    pub status: ConfigurationStatus,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Configuration {
    /// Fresh, unsaved document for an event
    pub fn new(event: &EventProfile, search_window_days: i64, now: DateTime<Utc>) -> Self {
        let mut configuration = Self {
            event_id: event.id,
            version: 0,
            event_airport_code: AirportCode::from_raw(event.airport_code.as_deref()),
            event_city: event.city.clone(),
            search_window: SearchWindow::around_event(event.start_date, event.end_date, search_window_days),
            groups: Vec::new(),
            location_groups: Vec::new(),
            stats: ConfigurationStats::default(),
            status: ConfigurationStatus::Draft,
            published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        configuration.refresh_stats();
        configuration
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        let key = group_key(name);
        self.groups.iter().find(|g| group_key(&g.name) == key)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        let key = group_key(name);
        self.groups.iter_mut().find(|g| group_key(&g.name) == key)
    }

    pub fn location_group(&self, name: &str) -> Option<&LocationGroup> {
        let key = group_key(name);
        self.location_groups.iter().find(|g| group_key(&g.name) == key)
    }

    pub fn location_group_mut(&mut self, name: &str) -> Option<&mut LocationGroup> {
        let key = group_key(name);
        self.location_groups.iter_mut().find(|g| group_key(&g.name) == key)
    }

    /// Location group or `NotFound`
    pub fn require_location_group_mut(&mut self, name: &str) -> Result<&mut LocationGroup> {
        let event_id = self.event_id;
        self.location_group_mut(name)
            .ok_or_else(|| LogisticsError::not_found("location group", format!("{} (event {})", name, event_id)))
    }

    /// Accommodation group the guest currently belongs to
    pub fn group_of(&self, email: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains(email))
    }

    /// Location group the guest currently belongs to
    pub fn location_group_of(&self, email: &str) -> Option<&LocationGroup> {
        self.location_groups.iter().find(|g| g.contains(email))
    }

    /// Names of location groups that are not configured, in document order
    pub fn unconfigured_group_names(&self) -> Vec<String> {
        self.location_groups
            .iter()
            .filter(|g| !g.is_configured())
            .map(|g| g.name.clone())
            .collect()
    }

    /// Everything currently preventing publication, computed from live state
    pub fn blockers(&self) -> Vec<PublishBlocker> {
        let mut blockers = Vec::new();

        if self.location_groups.is_empty() {
            blockers.push(PublishBlocker::NoGroups);
        }

        if !self.event_airport_code.is_valid() {
            blockers.push(PublishBlocker::DestinationInvalid {
                raw: self.event_airport_code.raw().map(str::to_string),
            });
        }

        for group in &self.location_groups {
            if !group.origin.is_valid() {
                blockers.push(PublishBlocker::OriginInvalid {
                    group: group.name.clone(),
                    raw: group.origin.raw().map(str::to_string),
                });
            }
            for journey in group.missing_journeys() {
                blockers.push(PublishBlocker::MissingSelection {
                    group: group.name.clone(),
                    journey,
                });
            }
        }

        blockers
    }

    /// True when every location group is configured and there is at least one
    pub fn configured(&self) -> bool {
        !self.location_groups.is_empty() && self.location_groups.iter().all(|g| g.is_configured())
    }

    pub fn refresh_stats(&mut self) {
        let total_groups = self.location_groups.len();
        let configured_groups = self.location_groups.iter().filter(|g| g.is_configured()).count();
        let completion_percentage = if total_groups == 0 {
            0
        } else {
            (configured_groups * 100 / total_groups) as u8
        };

        self.stats = ConfigurationStats {
            total_groups,
            configured_groups,
            total_guests: self.location_groups.iter().map(|g| g.members.len()).sum(),
            empty_groups: self.location_groups.iter().filter(|g| g.is_empty()).count(),
            accommodation_groups: self.groups.len(),
            completion_percentage,
        };

        self.status = if self.published {
            ConfigurationStatus::Published
        } else if total_groups > 0 && configured_groups == total_groups {
            ConfigurationStatus::Completed
        } else if configured_groups > 0 {
            ConfigurationStatus::InProgress
        } else {
            ConfigurationStatus::Draft
        };
    }

    pub fn mark_published(&mut self, now: DateTime<Utc>) {
        self.published = true;
        self.published_at = Some(now);
        self.refresh_stats();
    }

    /// Withdraws guest visibility; the previous timestamp is kept for audit
    pub fn withdraw_publication(&mut self) {
        self.published = false;
        self.refresh_stats();
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.refresh_stats();
        self.updated_at = now;
    }
}

/// Result of a publish attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub ok: bool,
    pub missing_group_names: Vec<String>,
    pub blockers: Vec<PublishBlocker>,
    pub published_at: Option<DateTime<Utc>>,
}

impl PublishOutcome {
    /// Turns a blocked outcome into a precondition error carrying the remediation list
    pub fn into_result(self) -> Result<DateTime<Utc>> {
        match (self.ok, self.published_at) {
            (true, Some(at)) => Ok(at),
            _ => Err(LogisticsError::PublicationBlocked {
                missing_groups: self.missing_group_names,
                blockers: self.blockers,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlightSelection, JourneyType, MemberRef};
    use chrono::NaiveDate;

    fn event() -> EventProfile {
        EventProfile {
            id: Uuid::new_v4(),
            name: "Offsite".to_string(),
            city: Some("Goa".to_string()),
            country: Some("India".to_string()),
            airport_code: Some("GOI".to_string()),
            start_date: NaiveDate::from_ymd_opt(2026, 12, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 12).unwrap(),
            budget_per_guest: None,
            event_type: None,
        }
    }

    fn selection(group: &str, journey: JourneyType) -> FlightSelection {
        FlightSelection {
            group_name: group.to_string(),
            journey_type: journey,
            origin: "DEL".to_string(),
            destination: "GOI".to_string(),
            options: vec![crate::models::FlightOption {
                result_index: "r1".to_string(),
                trace_id: None,
                journey_type: journey,
                carrier: "IndiGo".to_string(),
                carrier_code: "6E".to_string(),
                flight_number: "6E-101".to_string(),
                origin: "DEL".to_string(),
                destination: "GOI".to_string(),
                departure_time: Utc::now(),
                arrival_time: Utc::now(),
                duration_minutes: Some(150),
                cabin_class: "Economy".to_string(),
                stops: 0,
                baggage: None,
                refundable: true,
                fare: crate::models::FareBreakdown {
                    base_fare: 4000.0,
                    tax: 600.0,
                    total_fare: 4600.0,
                    currency: "INR".to_string(),
                },
            }],
            selected_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_configuration_is_blocked_with_no_groups() {
        let configuration = Configuration::new(&event(), 3, Utc::now());
        assert_eq!(configuration.status, ConfigurationStatus::Draft);
        assert!(!configuration.configured());
        assert_eq!(configuration.blockers(), vec![PublishBlocker::NoGroups]);
    }

    #[test]
    fn test_stats_track_configured_groups() {
        let mut configuration = Configuration::new(&event(), 3, Utc::now());
        let window = configuration.search_window;
        let mut delhi = LocationGroup::new("Delhi (DEL)", window);
        delhi.push_member(MemberRef::derived("a@example.com"));
        delhi.set_selection(selection("Delhi (DEL)", JourneyType::Arrival));
        delhi.set_selection(selection("Delhi (DEL)", JourneyType::Departure));
        configuration.location_groups.push(delhi);
        configuration.location_groups.push(LocationGroup::new("Mumbai (BOM)", window));
        configuration.refresh_stats();

        assert_eq!(configuration.stats.total_groups, 2);
        assert_eq!(configuration.stats.configured_groups, 1);
        assert_eq!(configuration.stats.total_guests, 1);
        assert_eq!(configuration.stats.empty_groups, 1);
        assert_eq!(configuration.stats.completion_percentage, 50);
        assert_eq!(configuration.status, ConfigurationStatus::InProgress);
        assert_eq!(configuration.unconfigured_group_names(), vec!["Mumbai (BOM)".to_string()]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut configuration = Configuration::new(&event(), 3, Utc::now());
        let window = configuration.search_window;
        configuration.location_groups.push(LocationGroup::new("Delhi (DEL)", window));
        assert!(configuration.location_group("delhi (del)").is_some());
        assert!(configuration.location_group("  DELHI (DEL) ").is_some());
        assert!(configuration.location_group("Mumbai").is_none());
    }

    #[test]
    fn test_blocked_outcome_becomes_precondition_error() {
        let outcome = PublishOutcome {
            ok: false,
            missing_group_names: vec!["Mumbai (BOM)".to_string()],
            blockers: vec![],
            published_at: None,
        };
        match outcome.into_result() {
            Err(LogisticsError::PublicationBlocked { missing_groups, .. }) => {
                assert_eq!(missing_groups, vec!["Mumbai (BOM)".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
