//! Flight configuration workflow
//!
//! Per event: initialize (group guests by departure location), search the
//! inventory per group and journey, select up to the configured number of
//! options, and expose the published result to guests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    AirportCode, AssignedFlights, Configuration, FlightOption, FlightSearchQuery, FlightSelection, JourneyType,
    LocationGroup, SearchWindow,
};
use crate::services::collaborators::FlightInventory;
use crate::services::configuration::ConfigurationService;
use crate::services::grouping::{GroupingEngine, SyncReport};
use crate::utils::errors::{FlightInventoryError, LogisticsError, Result};
use crate::utils::helpers::normalize_email;
use crate::utils::logging::{log_selection, log_upstream_error};

#[derive(Debug, Clone)]
pub struct InitializeOutcome {
    pub configuration: Configuration,
    pub report: SyncReport,
    /// No guest has a departure location, so there is nothing to configure yet
    pub no_groups: bool,
}

/// Where an arrival or departure flies between
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub origin: String,
    pub destination: String,
}

/// Route for a journey, once both ends carry valid codes
pub fn route_for(group: &LocationGroup, event_code: &AirportCode, journey: JourneyType) -> Result<Route> {
    let origin = group.origin.as_valid().ok_or_else(|| {
        LogisticsError::validation(
            "origin",
            format!(
                "group '{}' needs a valid 3-letter origin code (currently {})",
                group.name,
                group.origin.raw().unwrap_or("missing")
            ),
        )
    })?;
    let destination = event_code.as_valid().ok_or_else(|| {
        LogisticsError::validation(
            "event_airport_code",
            format!(
                "the event needs a valid 3-letter airport code (currently {})",
                event_code.raw().unwrap_or("missing")
            ),
        )
    })?;

    Ok(match journey {
        JourneyType::Arrival => Route {
            origin: origin.to_string(),
            destination: destination.to_string(),
        },
        JourneyType::Departure => Route {
            origin: destination.to_string(),
            destination: origin.to_string(),
        },
    })
}

/// Checks a candidate selection; returns the route it was validated against
pub fn validate_selection(
    group: &LocationGroup,
    event_code: &AirportCode,
    journey: JourneyType,
    options: &[FlightOption],
    max_selected: usize,
) -> Result<Route> {
    if options.is_empty() {
        return Err(LogisticsError::validation("options", "select at least one flight option"));
    }
    if options.len() > max_selected {
        return Err(LogisticsError::validation(
            "options",
            format!("at most {} flight options can be selected, got {}", max_selected, options.len()),
        ));
    }
    if let Some(other) = options.iter().find(|o| o.journey_type != journey) {
        return Err(LogisticsError::validation(
            "journey_type",
            format!(
                "option {} is a {} flight but the selection is for {}",
                other.result_index, other.journey_type, journey
            ),
        ));
    }

    let route = route_for(group, event_code, journey)?;
    if let Some(off_route) = options
        .iter()
        .find(|o| o.origin != route.origin || o.destination != route.destination)
    {
        return Err(LogisticsError::validation(
            "route",
            format!(
                "option {} flies {}-{} but the {} route is {}-{}",
                off_route.result_index,
                off_route.origin,
                off_route.destination,
                journey,
                route.origin,
                route.destination
            ),
        ));
    }

    Ok(route)
}

pub struct FlightConfigurationWorkflow {
    grouping: Arc<GroupingEngine>,
    inventory: Arc<dyn FlightInventory>,
    configurations: ConfigurationService,
    search_timeout: Duration,
}

impl FlightConfigurationWorkflow {
    pub fn new(
        grouping: Arc<GroupingEngine>,
        inventory: Arc<dyn FlightInventory>,
        configurations: ConfigurationService,
        search_timeout: Duration,
    ) -> Self {
        Self {
            grouping,
            inventory,
            configurations,
            search_timeout,
        }
    }

    /// Create or re-sync the event's groups. Existing selections are kept for
    /// groups that still exist with the same origin.
    pub async fn initialize(&self, event_id: Uuid) -> Result<InitializeOutcome> {
        let outcome = self.grouping.synchronize(event_id).await?;
        let no_groups = outcome.configuration.location_groups.is_empty();

        if no_groups {
            info!(event_id = %event_id, "No guest has a departure location; no groups to configure");
        } else {
            info!(
                event_id = %event_id,
                groups = outcome.configuration.stats.total_groups,
                configured = outcome.configuration.stats.configured_groups,
                "Flight configuration initialized"
            );
        }

        Ok(InitializeOutcome {
            configuration: outcome.configuration,
            report: outcome.report,
            no_groups,
        })
    }

    /// Query the inventory for one group and journey. Never mutates state.
    pub async fn search(
        &self,
        event_id: Uuid,
        group: &str,
        journey: JourneyType,
        date: NaiveDate,
    ) -> Result<Vec<FlightOption>> {
        let configuration = self.configurations.get(event_id).await?;
        let location_group = configuration
            .location_group(group)
            .ok_or_else(|| LogisticsError::not_found("location group", group.to_string()))?;
        let route = route_for(location_group, &configuration.event_airport_code, journey)?;

        if !location_group.search_window.contains(journey, date) {
            let (start, end) = location_group.search_window.bounds(journey);
            return Err(LogisticsError::validation(
                "date",
                format!("{} flights must be between {} and {}, got {}", journey, start, end, date),
            ));
        }

        let query = FlightSearchQuery::economy(&route.origin, &route.destination, date, journey);
        debug!(event_id = %event_id, group = %location_group.name, journey = %journey, date = %date, "Searching flights");

        match tokio::time::timeout(self.search_timeout, self.inventory.search_flights(&query)).await {
            Ok(result) => result,
            Err(_) => {
                log_upstream_error("flight_inventory", "search timed out", Some(&query.cache_key()));
                Err(FlightInventoryError::Timeout.into())
            }
        }
    }

    /// Replace the group's selection for the journey
    pub async fn select(
        &self,
        event_id: Uuid,
        group: &str,
        journey: JourneyType,
        options: Vec<FlightOption>,
    ) -> Result<Configuration> {
        let max_selected = self.configurations.workflow().max_selected_flights;
        let count = options.len();

        let (configuration, group_name) = self
            .configurations
            .mutate(event_id, move |configuration| {
                let event_code = configuration.event_airport_code.clone();
                let target = configuration.require_location_group_mut(group)?;
                let route = validate_selection(target, &event_code, journey, &options, max_selected)?;

                let group_name = target.name.clone();
                target.set_selection(FlightSelection {
                    group_name: group_name.clone(),
                    journey_type: journey,
                    origin: route.origin,
                    destination: route.destination,
                    options,
                    selected_at: Utc::now(),
                });
                Ok(group_name)
            })
            .await?;

        log_selection(event_id, &group_name, journey, count);
        Ok(configuration)
    }

    /// Set the event's own airport. A different code drops every selection.
    pub async fn set_event_airport_code(&self, event_id: Uuid, code: &str) -> Result<Configuration> {
        let parsed = AirportCode::parse(code)?;

        let (configuration, cleared) = self
            .configurations
            .mutate(event_id, move |configuration| {
                if configuration.event_airport_code == parsed {
                    return Ok(0);
                }
                configuration.event_airport_code = parsed;
                Ok(configuration
                    .location_groups
                    .iter_mut()
                    .map(|g| g.clear_selections())
                    .filter(|cleared| *cleared)
                    .count())
            })
            .await?;

        info!(event_id = %event_id, code = %code.trim(), cleared_groups = cleared, "Event airport code set");
        Ok(configuration)
    }

    /// Which journeys a group needs before it counts as configured
    pub async fn set_required_journeys(
        &self,
        event_id: Uuid,
        group: &str,
        journeys: Vec<JourneyType>,
    ) -> Result<Configuration> {
        let mut journeys = journeys;
        journeys.sort();
        journeys.dedup();
        if journeys.is_empty() {
            return Err(LogisticsError::validation(
                "required_journeys",
                "at least one journey type is required",
            ));
        }

        let (configuration, ()) = self
            .configurations
            .mutate(event_id, move |configuration| {
                configuration.require_location_group_mut(group)?.required_journeys = journeys;
                Ok(())
            })
            .await?;

        Ok(configuration)
    }

    /// Replace the travel dates searches are allowed for. Applies to every
    /// location group and to groups created by later synchronizations.
    /// Existing selections are kept.
    pub async fn set_search_window(&self, event_id: Uuid, window: SearchWindow) -> Result<Configuration> {
        window.validate()?;

        let (configuration, ()) = self
            .configurations
            .mutate(event_id, move |configuration| {
                configuration.search_window = window;
                for group in configuration.location_groups.iter_mut() {
                    group.search_window = window;
                }
                Ok(())
            })
            .await?;

        info!(
            event_id = %event_id,
            arrival_start = %window.arrival_start,
            departure_end = %window.departure_end,
            "Search window set"
        );
        Ok(configuration)
    }

    /// The flights a guest sees; only once the configuration is published
    pub async fn assigned_flights(&self, event_id: Uuid, guest_email: &str) -> Result<AssignedFlights> {
        let configuration = self.configurations.get(event_id).await?;
        if !configuration.published {
            return Err(LogisticsError::NotPublished { event_id });
        }

        let email = normalize_email(guest_email);
        let group = configuration
            .location_group_of(&email)
            .ok_or_else(|| LogisticsError::not_found("guest flight assignment", email.clone()))?;

        let options_for = |journey: JourneyType| {
            group
                .selection(journey)
                .map(|s| s.options.clone())
                .unwrap_or_default()
        };

        Ok(AssignedFlights {
            group_name: group.name.clone(),
            origin: group.origin.raw().unwrap_or_default().to_string(),
            destination: configuration.event_airport_code.raw().unwrap_or_default().to_string(),
            arrival: options_for(JourneyType::Arrival),
            departure: options_for(JourneyType::Departure),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FareBreakdown, SearchWindow};
    use chrono::TimeZone;

    fn group() -> LocationGroup {
        let start = NaiveDate::from_ymd_opt(2026, 12, 10).unwrap();
        LocationGroup::new("Delhi (DEL)", SearchWindow::around_event(start, start, 3))
    }

    fn option(journey: JourneyType, origin: &str, destination: &str) -> FlightOption {
        FlightOption {
            result_index: format!("{}-{}", origin, destination),
            trace_id: None,
            journey_type: journey,
            carrier: "IndiGo".to_string(),
            carrier_code: "6E".to_string(),
            flight_number: "6E-101".to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_time: Utc.with_ymd_and_hms(2026, 12, 9, 6, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2026, 12, 9, 8, 30, 0).unwrap(),
            duration_minutes: Some(150),
            cabin_class: "Economy".to_string(),
            stops: 0,
            baggage: Some("15 KG".to_string()),
            refundable: false,
            fare: FareBreakdown {
                base_fare: 4200.0,
                tax: 700.0,
                total_fare: 4900.0,
                currency: "INR".to_string(),
            },
        }
    }

    #[test]
    fn test_departure_route_is_reversed() {
        let event_code = AirportCode::Valid("GOI".to_string());
        let route = route_for(&group(), &event_code, JourneyType::Departure).unwrap();
        assert_eq!(route.origin, "GOI");
        assert_eq!(route.destination, "DEL");
    }

    #[test]
    fn test_selection_rejects_mixed_journeys() {
        let event_code = AirportCode::Valid("GOI".to_string());
        let options = vec![
            option(JourneyType::Arrival, "DEL", "GOI"),
            option(JourneyType::Departure, "GOI", "DEL"),
        ];
        let err = validate_selection(&group(), &event_code, JourneyType::Arrival, &options, 5).unwrap_err();
        assert!(matches!(err, LogisticsError::Validation { ref field, .. } if field == "journey_type"));
    }

    #[test]
    fn test_selection_rejects_wrong_route() {
        let event_code = AirportCode::Valid("GOI".to_string());
        let options = vec![option(JourneyType::Arrival, "BOM", "GOI")];
        let err = validate_selection(&group(), &event_code, JourneyType::Arrival, &options, 5).unwrap_err();
        assert!(matches!(err, LogisticsError::Validation { ref field, .. } if field == "route"));
    }

    #[test]
    fn test_selection_requires_valid_destination() {
        let event_code = AirportCode::Unvalidated("goa".to_string());
        let options = vec![option(JourneyType::Arrival, "DEL", "GOI")];
        let err = validate_selection(&group(), &event_code, JourneyType::Arrival, &options, 5).unwrap_err();
        assert!(matches!(err, LogisticsError::Validation { ref field, .. } if field == "event_airport_code"));
    }

    #[test]
    fn test_selection_requires_valid_origin() {
        let start = NaiveDate::from_ymd_opt(2026, 12, 10).unwrap();
        let family = LocationGroup::new("Family", SearchWindow::around_event(start, start, 3));
        let event_code = AirportCode::Valid("GOI".to_string());
        let options = vec![option(JourneyType::Arrival, "FAM", "GOI")];
        let err = validate_selection(&family, &event_code, JourneyType::Arrival, &options, 5).unwrap_err();
        assert!(matches!(err, LogisticsError::Validation { ref field, .. } if field == "origin"));
    }
}
