use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Veterinarian {
    pub id: i64,
    pub full_name: String,
    pub specialty: String,
    /// Linked login account, if any
    pub user_app_id: Option<i64>,
}
