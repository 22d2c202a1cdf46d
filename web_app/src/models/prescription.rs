use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Prescription {
    pub id: i64,
    pub appointment_id: i64,
    pub pet_id: i64,
    pub veterinarian_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub instructions: String,
    pub issued_on: NaiveDate,
    pub paid: bool,
    pub product_name: String,
}
