//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod guest;
pub mod event;
pub mod group;
pub mod flight;
pub mod hotel;
pub mod configuration;
pub mod recommendation;

// Re-export commonly used models
pub use guest::{Guest, PastStay};
pub use event::EventProfile;
pub use group::{AirportCode, Group, GroupMetadata, GroupOrigin, GroupingKind, LocationGroup, MemberRef, MemberSource, Membership, SearchWindow};
pub use flight::{AssignedFlights, FareBreakdown, FlightOption, FlightSearchQuery, FlightSelection, JourneyType};
pub use hotel::{Hotel, HotelLocation, PriceRange, PriceTier};
pub use configuration::{Configuration, ConfigurationStats, ConfigurationStatus, PublishOutcome};
pub use recommendation::{GroupRecommendation, GuestRecommendation, RankedHotels, RecommendationSet, ScoredHotel};
