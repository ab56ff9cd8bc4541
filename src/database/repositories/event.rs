//! Event repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::EventProfile;
use crate::services::collaborators::EventDirectory;
use crate::utils::errors::Result;

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    city: Option<String>,
    country: Option<String>,
    airport_code: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    budget_per_guest: Option<f64>,
    event_type: Option<String>,
}

impl From<EventRow> for EventProfile {
    fn from(row: EventRow) -> Self {
        EventProfile {
            id: row.id,
            name: row.name,
            city: row.city,
            country: row.country,
            airport_code: row.airport_code,
            start_date: row.start_date,
            end_date: row.end_date,
            budget_per_guest: row.budget_per_guest,
            event_type: row.event_type,
        }
    }
}

#[derive(Clone)]
pub struct PgEventDirectory {
    pool: PgPool,
}

impl PgEventDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventDirectory for PgEventDirectory {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventProfile>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, name, city, country, airport_code, start_date, end_date, budget_per_guest, event_type
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(EventProfile::from))
    }
}
