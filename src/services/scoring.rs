//! Hotel scoring
//!
//! Each candidate gets four factor scores in 0..=100 (price, facilities,
//! capacity, location) combined by configured weights. Each factor also
//! yields a reason; the strongest contributions are surfaced with the score.
//! Personal rankings start from the guest's group context and add booking
//! history signals. Everything here is read-only.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ScoringConfig;
use crate::models::{
    EventProfile, Group, GroupRecommendation, Guest, GuestRecommendation, Hotel, Membership, PastStay, PriceTier,
    RankedHotels, RecommendationSet, ScoredHotel,
};
use crate::services::collaborators::{BookingHistory, ConfigurationStore, EventDirectory, GuestRoster, HotelCatalog};
use crate::utils::errors::{LogisticsError, Result};
use crate::utils::helpers::normalize_labels;

/// Points per earlier stay at the same hotel
const HISTORY_POINTS_PER_STAY: f64 = 10.0;
const HISTORY_POINTS_CAP: f64 = 20.0;
/// Bonus when a hotel fits the guest's usual nightly spend
const USUAL_SPEND_POINTS: f64 = 10.0;
/// Reasons returned per candidate
const MAX_REASONS: usize = 3;

/// What a ranking is computed for: a group, or a guest on their own
#[derive(Debug, Clone)]
pub struct GroupContext {
    pub name: Option<String>,
    pub size: u32,
    pub budget_per_night: Option<f64>,
    pub amenities: Vec<String>,
}

impl GroupContext {
    pub fn for_group(group: &Group, event: &EventProfile, config: &ScoringConfig) -> Self {
        let amenities = if group.metadata.preferred_amenities.is_empty() {
            normalize_labels(&config.preferred_amenities)
        } else {
            normalize_labels(&group.metadata.preferred_amenities)
        };
        Self {
            name: Some(group.name.clone()),
            size: group.planning_size().max(1),
            budget_per_night: group.metadata.budget_per_night.or(event.budget_per_guest),
            amenities,
        }
    }

    pub fn solo(event: &EventProfile, config: &ScoringConfig) -> Self {
        Self {
            name: None,
            size: 1,
            budget_per_night: event.budget_per_guest,
            amenities: normalize_labels(&config.preferred_amenities),
        }
    }
}

/// One factor's weighted contribution and its human-readable reason
#[derive(Debug, Clone, PartialEq)]
struct Contribution {
    points: f64,
    reason: Option<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn price_factor(hotel: &Hotel, budget: Option<f64>, tolerance: f64) -> (f64, Option<String>) {
    let (Some(range), Some(budget)) = (hotel.price_range, budget) else {
        return (50.0, None);
    };
    let rate = range.average();
    let hotel_tier = PriceTier::from_nightly_rate(rate);

    if rate <= budget {
        (100.0, Some(format!("Within budget ({} at ~{:.0}/night)", hotel_tier, rate)))
    } else if rate <= budget * (1.0 + tolerance) {
        (75.0, Some("Slightly above budget".to_string()))
    } else {
        match hotel_tier.distance(PriceTier::from_nightly_rate(budget)) {
            0 => (50.0, None),
            1 => (30.0, None),
            _ => (10.0, None),
        }
    }
}

fn facility_factor(hotel: &Hotel, amenities: &[String], event_type: Option<&str>) -> (f64, Option<String>) {
    let facilities = normalize_labels(&hotel.facilities);
    let matched: Vec<&String> = amenities
        .iter()
        .filter(|wanted| facilities.iter().any(|f| f.contains(wanted.as_str())))
        .collect();
    let amenity_score = if amenities.is_empty() {
        50.0
    } else {
        matched.len() as f64 / amenities.len() as f64 * 100.0
    };

    let specialization = event_type.map(str::trim).filter(|t| !t.is_empty()).and_then(|event_type| {
        let wanted = event_type.to_lowercase();
        hotel
            .specializations
            .iter()
            .find(|s| {
                let s = s.to_lowercase();
                s.contains(&wanted) || wanted.contains(&s)
            })
            .map(|_| event_type.to_string())
    });

    match specialization {
        Some(event_type) => (
            (amenity_score * 0.7 + 30.0).min(100.0),
            Some(format!("Specializes in {} events", event_type)),
        ),
        None if !matched.is_empty() => {
            let listed: Vec<&str> = matched.iter().take(3).map(|s| s.as_str()).collect();
            (amenity_score, Some(format!("Offers {}", listed.join(", "))))
        }
        None => (amenity_score, None),
    }
}

fn capacity_factor(hotel: &Hotel, group_size: u32) -> (f64, Option<String>) {
    let Some(rooms) = hotel.total_rooms else {
        return (50.0, None);
    };
    let needed = group_size.div_ceil(2).max(1);

    if rooms >= needed {
        (100.0, Some(format!("Enough rooms for {} guests", group_size)))
    } else if f64::from(rooms) >= f64::from(needed) * 0.7 {
        (70.0, Some("Can host most of the group".to_string()))
    } else {
        (30.0, None)
    }
}

fn location_factor(hotel: &Hotel, event_city: Option<&str>) -> (f64, Option<String>) {
    let (Some(city), Some(hotel_city)) = (event_city, hotel.location.city.as_deref()) else {
        return (50.0, None);
    };
    let city_lower = city.trim().to_lowercase();
    let hotel_lower = hotel_city.trim().to_lowercase();

    if city_lower == hotel_lower {
        (100.0, Some(format!("Located in {}", city.trim())))
    } else if city_lower.contains(&hotel_lower) || hotel_lower.contains(&city_lower) {
        (80.0, Some(format!("Close to {}", city.trim())))
    } else {
        (30.0, None)
    }
}

/// Strongest reasons first; never empty
fn top_reasons(mut contributions: Vec<Contribution>) -> Vec<String> {
    contributions.sort_by(|a, b| b.points.total_cmp(&a.points));
    let reasons: Vec<String> = contributions
        .into_iter()
        .filter(|c| c.points > 0.0)
        .filter_map(|c| c.reason)
        .take(MAX_REASONS)
        .collect();

    if reasons.is_empty() {
        vec!["Available in the event's hotel selection".to_string()]
    } else {
        reasons
    }
}

fn weighted_contributions(
    hotel: &Hotel,
    context: &GroupContext,
    event: &EventProfile,
    config: &ScoringConfig,
) -> (f64, Vec<Contribution>) {
    let factors = [
        (config.price_weight, price_factor(hotel, context.budget_per_night, config.budget_tolerance)),
        (
            config.facility_weight,
            facility_factor(hotel, &context.amenities, event.event_type.as_deref()),
        ),
        (config.capacity_weight, capacity_factor(hotel, context.size)),
        (config.location_weight, location_factor(hotel, event.city.as_deref())),
    ];
    let total_weight: f64 = factors.iter().map(|(w, _)| *w).sum();

    let mut score = 0.0;
    let mut contributions = Vec::with_capacity(factors.len());
    for (weight, (value, reason)) in factors {
        let points = if total_weight > 0.0 { weight * value / total_weight } else { 0.0 };
        score += points;
        contributions.push(Contribution { points, reason });
    }

    (score, contributions)
}

/// Rank the catalog for a group context
pub fn rank_for_group(
    hotels: &[Hotel],
    context: &GroupContext,
    event: &EventProfile,
    config: &ScoringConfig,
) -> RankedHotels {
    let candidates = hotels
        .iter()
        .enumerate()
        .map(|(catalog_index, hotel)| {
            let (score, contributions) = weighted_contributions(hotel, context, event, config);
            ScoredHotel {
                hotel_id: hotel.id,
                hotel_name: hotel.name.clone(),
                score: round2(score.clamp(0.0, 100.0)),
                reasons: top_reasons(contributions),
                catalog_index,
            }
        })
        .collect();

    RankedHotels::from_unsorted(candidates)
}

/// Rank the catalog for one guest: group context plus booking history
pub fn rank_for_guest(
    hotels: &[Hotel],
    context: &GroupContext,
    stays: &[PastStay],
    event: &EventProfile,
    config: &ScoringConfig,
) -> RankedHotels {
    let priced: Vec<f64> = stays.iter().filter_map(|s| s.price_per_night).collect();
    let usual_spend = if priced.is_empty() {
        None
    } else {
        Some(priced.iter().sum::<f64>() / priced.len() as f64)
    };

    let candidates = hotels
        .iter()
        .enumerate()
        .map(|(catalog_index, hotel)| {
            let (base, mut contributions) = weighted_contributions(hotel, context, event, config);
            let base_points = base * config.personal_base_share;
            for contribution in contributions.iter_mut() {
                contribution.points *= config.personal_base_share;
            }

            let visits = stays.iter().filter(|s| s.hotel_id == hotel.id).count();
            let history_points = (visits as f64 * HISTORY_POINTS_PER_STAY).min(HISTORY_POINTS_CAP);
            if visits > 0 {
                let reason = if visits == 1 {
                    "You stayed here before".to_string()
                } else {
                    format!("You stayed here {} times", visits)
                };
                contributions.push(Contribution {
                    points: history_points,
                    reason: Some(reason),
                });
            }

            let spend_points = match (usual_spend, hotel.price_range) {
                (Some(usual), Some(range)) if range.average() <= usual * (1.0 + config.budget_tolerance) => {
                    contributions.push(Contribution {
                        points: USUAL_SPEND_POINTS,
                        reason: Some("Matches your usual nightly spend".to_string()),
                    });
                    USUAL_SPEND_POINTS
                }
                _ => 0.0,
            };

            ScoredHotel {
                hotel_id: hotel.id,
                hotel_name: hotel.name.clone(),
                score: round2((base_points + history_points + spend_points).clamp(0.0, 100.0)),
                reasons: top_reasons(contributions),
                catalog_index,
            }
        })
        .collect();

    RankedHotels::from_unsorted(candidates)
}

pub struct ScoringEngine {
    events: Arc<dyn EventDirectory>,
    catalog: Arc<dyn HotelCatalog>,
    history: Arc<dyn BookingHistory>,
    roster: Arc<dyn GuestRoster>,
    store: Arc<dyn ConfigurationStore>,
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(
        events: Arc<dyn EventDirectory>,
        catalog: Arc<dyn HotelCatalog>,
        history: Arc<dyn BookingHistory>,
        roster: Arc<dyn GuestRoster>,
        store: Arc<dyn ConfigurationStore>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            events,
            catalog,
            history,
            roster,
            store,
            config,
        }
    }

    async fn stays_of(&self, guest: &Guest) -> Vec<PastStay> {
        match self.history.past_stays(&guest.key()).await {
            Ok(stays) => stays,
            Err(e) => {
                warn!(guest = %guest.key(), error = %e, "Booking history unavailable; ranking without it");
                Vec::new()
            }
        }
    }

    /// Rankings for every accommodation group and every roster guest
    pub async fn recommend(&self, event_id: Uuid) -> Result<RecommendationSet> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| LogisticsError::not_found("event", event_id.to_string()))?;
        let hotels = self.catalog.list_selected_hotels(event_id).await?;
        let guests = self.roster.list_guests(event_id).await?;
        let groups = self
            .store
            .load(event_id)
            .await?
            .map(|configuration| configuration.groups)
            .unwrap_or_default();

        let group_recommendations: Vec<GroupRecommendation> = groups
            .iter()
            .map(|group| {
                let context = GroupContext::for_group(group, &event, &self.config);
                GroupRecommendation {
                    group_name: group.name.clone(),
                    group_size: context.size,
                    ranking: rank_for_group(&hotels, &context, &event, &self.config),
                }
            })
            .collect();

        let mut seen = std::collections::HashSet::new();
        let unique: Vec<&Guest> = guests.iter().filter(|g| seen.insert(g.key())).collect();
        let histories = join_all(unique.iter().map(|guest| self.stays_of(guest))).await;

        let mut guest_recommendations = Vec::with_capacity(unique.len());
        for (guest, stays) in unique.into_iter().zip(histories) {
            let email = guest.key();
            let group = groups.iter().find(|g| g.contains(&email));
            let context = match group {
                Some(group) => GroupContext::for_group(group, &event, &self.config),
                None => GroupContext::solo(&event, &self.config),
            };

            guest_recommendations.push(GuestRecommendation {
                email,
                group_name: context.name.clone(),
                ranking: rank_for_guest(&hotels, &context, &stays, &event, &self.config),
            });
        }

        debug!(
            event_id = %event_id,
            hotels = hotels.len(),
            groups = group_recommendations.len(),
            guests = guest_recommendations.len(),
            "Recommendations computed"
        );

        Ok(RecommendationSet {
            event_id,
            groups: group_recommendations,
            guests: guest_recommendations,
        })
    }
}
