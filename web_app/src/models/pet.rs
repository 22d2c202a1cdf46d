use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pet {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub birth_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
