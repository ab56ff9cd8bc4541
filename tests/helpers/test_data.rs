//! Test data builders

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use EventLogistics::models::{
    EventProfile, FareBreakdown, FlightOption, Guest, Hotel, HotelLocation, JourneyType, PriceRange,
};

pub fn event_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 10).unwrap()
}

pub fn event_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 12).unwrap()
}

/// A wedding in Goa with a valid event airport
pub fn sample_event(id: Uuid) -> EventProfile {
    EventProfile {
        id,
        name: "Beach Wedding".to_string(),
        city: Some("Goa".to_string()),
        country: Some("India".to_string()),
        airport_code: Some("GOI".to_string()),
        start_date: event_start(),
        end_date: event_end(),
        budget_per_guest: Some(6000.0),
        event_type: Some("Wedding".to_string()),
    }
}

pub fn guest(email: &str, tag: Option<&str>, departure: Option<&str>) -> Guest {
    let name = email.split('@').next().unwrap_or(email);
    let mut guest = Guest::new(email, name);
    if let Some(tag) = tag {
        guest = guest.with_tag(tag);
    }
    if let Some(departure) = departure {
        guest = guest.with_departure(departure);
    }
    guest
}

/// The two-guest roster: a VIP flying from Mumbai and family flying from Delhi
pub fn vip_and_family() -> Vec<Guest> {
    vec![
        guest("vip@example.com", Some("VIP"), Some("BOM")),
        guest("family@example.com", Some("Family"), Some("DEL")),
    ]
}

pub fn flight_option(index: usize, journey: JourneyType, origin: &str, destination: &str) -> FlightOption {
    let day = match journey {
        JourneyType::Arrival => 9,
        JourneyType::Departure => 13,
    };
    let departure_time = Utc.with_ymd_and_hms(2026, 12, day, 6 + index as u32 % 12, 0, 0).unwrap();

    FlightOption {
        result_index: format!("OB{}", index),
        trace_id: Some("trace-test".to_string()),
        journey_type: journey,
        carrier: "IndiGo".to_string(),
        carrier_code: "6E".to_string(),
        flight_number: format!("{}", 200 + index),
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure_time,
        arrival_time: departure_time + chrono::Duration::minutes(150),
        duration_minutes: Some(150),
        cabin_class: "Economy".to_string(),
        stops: 0,
        baggage: Some("15 KG".to_string()),
        refundable: index % 2 == 0,
        fare: FareBreakdown {
            base_fare: 4000.0 + index as f64 * 100.0,
            tax: 600.0,
            total_fare: 4600.0 + index as f64 * 100.0,
            currency: "INR".to_string(),
        },
    }
}

/// `count` options for the route, numbered from `first`
pub fn flight_options(first: usize, count: usize, journey: JourneyType, origin: &str, destination: &str) -> Vec<FlightOption> {
    (first..first + count)
        .map(|i| flight_option(i, journey, origin, destination))
        .collect()
}

pub fn hotel(name: &str, nightly: f64, rooms: u32, city: &str, facilities: &[&str], specializations: &[&str]) -> Hotel {
    Hotel {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price_range: Some(PriceRange { min: nightly, max: Some(nightly) }),
        facilities: facilities.iter().map(|s| s.to_string()).collect(),
        specializations: specializations.iter().map(|s| s.to_string()).collect(),
        total_rooms: Some(rooms),
        location: HotelLocation {
            city: Some(city.to_string()),
            country: Some("India".to_string()),
        },
    }
}
