//! Group models
//!
//! Accommodation groups (by declared tag) and location groups (by departure
//! location) live in independent namespaces; a guest can be in one of each.

use std::sync::OnceLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::flight::{FlightSelection, JourneyType};
use crate::utils::errors::{LogisticsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingKind {
    Accommodation,
    Location,
}

impl std::fmt::Display for GroupingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupingKind::Accommodation => write!(f, "accommodation"),
            GroupingKind::Location => write!(f, "location"),
        }
    }
}

/// How a guest ended up in a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSource {
    /// Placed by synchronization from roster attributes
    Derived,
    /// Placed by staff; synchronization leaves it alone
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub email: String,
    pub source: MemberSource,
}

impl MemberRef {
    pub fn derived(email: &str) -> Self {
        Self { email: email.to_string(), source: MemberSource::Derived }
    }

    pub fn manual(email: &str) -> Self {
        Self { email: email.to_string(), source: MemberSource::Manual }
    }
}

/// Membership operations shared by both group kinds
pub trait Membership {
    fn name(&self) -> &str;
    fn members(&self) -> &[MemberRef];
    fn members_mut(&mut self) -> &mut Vec<MemberRef>;
    fn refresh_count(&mut self);

    fn contains(&self, email: &str) -> bool {
        self.members().iter().any(|m| m.email == email)
    }

    /// Returns the removed membership, if the guest was a member
    fn remove_member(&mut self, email: &str) -> Option<MemberRef> {
        let position = self.members().iter().position(|m| m.email == email)?;
        let removed = self.members_mut().remove(position);
        self.refresh_count();
        Some(removed)
    }

    fn push_member(&mut self, member: MemberRef) {
        if !self.contains(&member.email) {
            self.members_mut().push(member);
            self.refresh_count();
        }
    }

    fn is_empty(&self) -> bool {
        self.members().is_empty()
    }
}

/// Whether staff or synchronization created the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrigin {
    Auto,
    Manual,
}

/// Optional hints used when scoring hotels for the group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMetadata {
    pub budget_per_night: Option<f64>,
    #[serde(default)]
    pub preferred_amenities: Vec<String>,
}

/// Accommodation group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub capacity: u32,
    pub description: Option<String>,
    pub origin: GroupOrigin,
    pub members: Vec<MemberRef>,
    pub members_count: usize,
    #[serde(default)]
    pub metadata: GroupMetadata,
}

impl Group {
    pub fn new(name: &str, capacity: u32, description: Option<String>, origin: GroupOrigin) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            description,
            origin,
            members: Vec::new(),
            members_count: 0,
            metadata: GroupMetadata::default(),
        }
    }

    /// Size used for capacity planning: the declared target or the actual head count
    pub fn planning_size(&self) -> u32 {
        self.capacity.max(self.members.len() as u32)
    }
}

impl Membership for Group {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> &[MemberRef] {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Vec<MemberRef> {
        &mut self.members
    }

    fn refresh_count(&mut self) {
        self.members_count = self.members.len();
    }
}

fn iata_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{3}$").expect("valid IATA pattern"))
}

fn parenthesized_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([A-Z]{3})\)").expect("valid code pattern"))
}

/// Airport code that is either verified against `^[A-Z]{3}$` or only a guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum AirportCode {
    Valid(String),
    Unvalidated(String),
    Missing,
}

impl AirportCode {
    /// Strict parse of a staff-entered code; lowercase is rejected, not corrected
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if iata_pattern().is_match(trimmed) {
            Ok(AirportCode::Valid(trimmed.to_string()))
        } else {
            Err(LogisticsError::validation(
                "airport_code",
                format!("'{}' must be exactly three uppercase letters (e.g. DEL)", raw),
            ))
        }
    }

    /// Code as supplied by a collaborator: kept when valid, flagged otherwise
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            None => AirportCode::Missing,
            Some(code) if iata_pattern().is_match(code) => AirportCode::Valid(code.to_string()),
            Some(code) => AirportCode::Unvalidated(code.to_string()),
        }
    }

    /// Best-effort guess from a free-text location such as "Delhi (DEL)" or "BOM"
    pub fn derive_from_location(location: &str) -> Self {
        let trimmed = location.trim();
        if let Some(captures) = parenthesized_code_pattern().captures(trimmed) {
            return AirportCode::Valid(captures[1].to_string());
        }
        if iata_pattern().is_match(trimmed) {
            return AirportCode::Valid(trimmed.to_string());
        }
        let guess: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .take(3)
            .collect::<String>()
            .to_uppercase();
        if guess.is_empty() {
            AirportCode::Missing
        } else {
            AirportCode::Unvalidated(guess)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, AirportCode::Valid(_))
    }

    pub fn as_valid(&self) -> Option<&str> {
        match self {
            AirportCode::Valid(code) => Some(code),
            _ => None,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            AirportCode::Valid(code) | AirportCode::Unvalidated(code) => Some(code),
            AirportCode::Missing => None,
        }
    }
}

/// Earliest/latest permissible travel date per journey type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub arrival_start: NaiveDate,
    pub arrival_end: NaiveDate,
    pub departure_start: NaiveDate,
    pub departure_end: NaiveDate,
}

/// Widest margin accepted around the event dates
pub const MAX_SEARCH_WINDOW_DAYS: i64 = 30;

impl SearchWindow {
    /// Arrivals in the `days` before the event starts, departures in the `days`
    /// after it ends. `days` is clamped to `0..=MAX_SEARCH_WINDOW_DAYS`.
    pub fn around_event(start: NaiveDate, end: NaiveDate, days: i64) -> Self {
        let days = days.clamp(0, MAX_SEARCH_WINDOW_DAYS);
        Self {
            arrival_start: start - Duration::days(days),
            arrival_end: start,
            departure_start: end,
            departure_end: end + Duration::days(days),
        }
    }

    pub fn bounds(&self, journey: JourneyType) -> (NaiveDate, NaiveDate) {
        match journey {
            JourneyType::Arrival => (self.arrival_start, self.arrival_end),
            JourneyType::Departure => (self.departure_start, self.departure_end),
        }
    }

    pub fn contains(&self, journey: JourneyType, date: NaiveDate) -> bool {
        let (start, end) = self.bounds(journey);
        date >= start && date <= end
    }

    /// Each journey's range must not end before it starts
    pub fn validate(&self) -> Result<()> {
        for journey in JourneyType::all() {
            let (start, end) = self.bounds(journey);
            if end < start {
                return Err(LogisticsError::validation(
                    "search_window",
                    format!("{} window ends ({}) before it starts ({})", journey, end, start),
                ));
            }
        }
        Ok(())
    }
}

/// Flight-logistics group keyed by departure location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGroup {
    pub name: String,
    pub origin: AirportCode,
    pub city: String,
    pub members: Vec<MemberRef>,
    pub guests_count: usize,
    pub search_window: SearchWindow,
    pub required_journeys: Vec<JourneyType>,
    pub arrival: Option<FlightSelection>,
    pub departure: Option<FlightSelection>,
}

impl LocationGroup {
    pub fn new(name: &str, search_window: SearchWindow) -> Self {
        Self {
            name: name.to_string(),
            origin: AirportCode::derive_from_location(name),
            city: name.split('(').next().unwrap_or(name).trim().to_string(),
            members: Vec::new(),
            guests_count: 0,
            search_window,
            required_journeys: JourneyType::all().to_vec(),
            arrival: None,
            departure: None,
        }
    }

    pub fn selection(&self, journey: JourneyType) -> Option<&FlightSelection> {
        match journey {
            JourneyType::Arrival => self.arrival.as_ref(),
            JourneyType::Departure => self.departure.as_ref(),
        }
    }

    /// Replaces whatever was selected for the journey
    pub fn set_selection(&mut self, selection: FlightSelection) {
        match selection.journey_type {
            JourneyType::Arrival => self.arrival = Some(selection),
            JourneyType::Departure => self.departure = Some(selection),
        }
    }

    /// Drops all selections; returns true if anything was dropped
    pub fn clear_selections(&mut self) -> bool {
        let had_any = self.arrival.is_some() || self.departure.is_some();
        self.arrival = None;
        self.departure = None;
        had_any
    }

    pub fn has_selection(&self, journey: JourneyType) -> bool {
        self.selection(journey).map(|s| !s.options.is_empty()).unwrap_or(false)
    }

    /// Journeys still lacking a non-empty selection
    pub fn missing_journeys(&self) -> Vec<JourneyType> {
        self.required_journeys
            .iter()
            .copied()
            .filter(|j| !self.has_selection(*j))
            .collect()
    }

    /// Valid origin and every required journey selected
    pub fn is_configured(&self) -> bool {
        self.origin.is_valid() && self.missing_journeys().is_empty()
    }
}

impl Membership for LocationGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> &[MemberRef] {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Vec<MemberRef> {
        &mut self.members
    }

    fn refresh_count(&mut self) {
        self.guests_count = self.members.len();
    }
}
