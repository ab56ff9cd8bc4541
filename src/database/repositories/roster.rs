//! Guest roster repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Guest;
use crate::services::collaborators::GuestRoster;
use crate::utils::errors::Result;

#[derive(Debug, sqlx::FromRow)]
struct GuestRow {
    email: String,
    name: String,
    phone: Option<String>,
    group_tag: Option<String>,
    departure_location: Option<String>,
}

impl From<GuestRow> for Guest {
    fn from(row: GuestRow) -> Self {
        Guest {
            email: row.email,
            name: row.name,
            phone: row.phone,
            group_tag: row.group_tag,
            departure_location: row.departure_location,
        }
    }
}

#[derive(Clone)]
pub struct PgGuestRoster {
    pool: PgPool,
}

impl PgGuestRoster {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestRoster for PgGuestRoster {
    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<Guest>> {
        let rows = sqlx::query_as::<_, GuestRow>(
            "SELECT email, name, phone, group_tag, departure_location FROM event_guests WHERE event_id = $1 ORDER BY id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Guest::from).collect())
    }
}
