//! Hotel recommendation results
//!
//! Computed on demand and never persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many candidates the default view shows
pub const DEFAULT_VIEW_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHotel {
    pub hotel_id: Uuid,
    pub hotel_name: String,
    /// 0..=100
    pub score: f64,
    /// Top contributing reasons, strongest first
    pub reasons: Vec<String>,
    /// Position in the event's hotel catalog; breaks score ties
    pub catalog_index: usize,
}

/// Candidates ordered by score descending, then catalog order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedHotels {
    pub candidates: Vec<ScoredHotel>,
}

impl RankedHotels {
    pub fn from_unsorted(mut candidates: Vec<ScoredHotel>) -> Self {
        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.catalog_index.cmp(&b.catalog_index))
        });
        Self { candidates }
    }

    /// The primary recommendation
    pub fn primary(&self) -> Option<&ScoredHotel> {
        self.candidates.first()
    }

    pub fn default_view(&self) -> &[ScoredHotel] {
        let end = self.candidates.len().min(DEFAULT_VIEW_SIZE);
        &self.candidates[..end]
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecommendation {
    pub group_name: String,
    pub group_size: u32,
    pub ranking: RankedHotels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestRecommendation {
    pub email: String,
    /// Accommodation group whose context was used, if any
    pub group_name: Option<String>,
    pub ranking: RankedHotels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub event_id: Uuid,
    pub groups: Vec<GroupRecommendation>,
    pub guests: Vec<GuestRecommendation>,
}

impl RecommendationSet {
    pub fn for_group(&self, name: &str) -> Option<&GroupRecommendation> {
        let key = crate::utils::helpers::group_key(name);
        self.groups
            .iter()
            .find(|g| crate::utils::helpers::group_key(&g.group_name) == key)
    }

    pub fn for_guest(&self, email: &str) -> Option<&GuestRecommendation> {
        let key = crate::utils::helpers::normalize_email(email);
        self.guests.iter().find(|g| g.email == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(name: &str, score: f64, catalog_index: usize) -> ScoredHotel {
        ScoredHotel {
            hotel_id: Uuid::new_v4(),
            hotel_name: name.to_string(),
            score,
            reasons: vec!["Good value".to_string()],
            catalog_index,
        }
    }

    #[test]
    fn test_ties_follow_catalog_order() {
        let ranked = RankedHotels::from_unsorted(vec![
            scored("C", 70.0, 2),
            scored("B", 80.0, 1),
            scored("A", 80.0, 0),
            scored("D", 10.0, 3),
        ]);
        let names: Vec<_> = ranked.candidates.iter().map(|c| c.hotel_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert_eq!(ranked.primary().map(|c| c.hotel_name.as_str()), Some("A"));
        assert_eq!(ranked.default_view().len(), 3);
    }
}
