//! Hotel catalog and booking history repositories

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Hotel, HotelLocation, PastStay, PriceRange};
use crate::services::collaborators::{BookingHistory, HotelCatalog};
use crate::utils::errors::Result;
use crate::utils::helpers::normalize_email;

#[derive(Debug, sqlx::FromRow)]
struct HotelRow {
    id: Uuid,
    name: String,
    price_min: Option<f64>,
    price_max: Option<f64>,
    facilities: Vec<String>,
    specializations: Vec<String>,
    total_rooms: Option<i32>,
    city: Option<String>,
    country: Option<String>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        let price_range = match (row.price_min, row.price_max) {
            (Some(min), max) => Some(PriceRange { min, max }),
            (None, Some(max)) => Some(PriceRange { min: max, max: Some(max) }),
            (None, None) => None,
        };
        Hotel {
            id: row.id,
            name: row.name,
            price_range,
            facilities: row.facilities,
            specializations: row.specializations,
            total_rooms: row.total_rooms.and_then(|r| u32::try_from(r).ok()),
            location: HotelLocation {
                city: row.city,
                country: row.country,
            },
        }
    }
}

#[derive(Clone)]
pub struct PgHotelCatalog {
    pool: PgPool,
}

impl PgHotelCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HotelCatalog for PgHotelCatalog {
    async fn list_selected_hotels(&self, event_id: Uuid) -> Result<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(
            r#"
            SELECT h.id, h.name, h.price_min, h.price_max, h.facilities, h.specializations,
                   h.total_rooms, h.city, h.country
            FROM event_selected_hotels s
            JOIN hotels h ON h.id = s.hotel_id
            WHERE s.event_id = $1
            ORDER BY s.position
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Hotel::from).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StayRow {
    hotel_id: Uuid,
    price_per_night: Option<f64>,
}

#[derive(Clone)]
pub struct PgBookingHistory {
    pool: PgPool,
}

impl PgBookingHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingHistory for PgBookingHistory {
    async fn past_stays(&self, guest_email: &str) -> Result<Vec<PastStay>> {
        let rows = sqlx::query_as::<_, StayRow>(
            r#"
            SELECT hotel_id, price_per_night
            FROM hotel_bookings
            WHERE lower(guest_email) = $1 AND status = 'confirmed'
            ORDER BY created_at
            "#,
        )
        .bind(normalize_email(guest_email))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PastStay {
                hotel_id: row.hotel_id,
                price_per_night: row.price_per_night,
            })
            .collect())
    }
}
