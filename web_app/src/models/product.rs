use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price of `quantity` units, rounded to cents. `None` on overflow.
    pub fn total_for(&self, quantity: u32) -> Option<Decimal> {
        self.price
            .checked_mul(Decimal::from(quantity))
            .map(|total| total.round_dp(2))
    }
}
