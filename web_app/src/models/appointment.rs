use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Display, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, sqlx::Type,
)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    #[display("PROGRAMADA")]
    #[serde(rename = "PROGRAMADA")]
    Programada,
    #[display("EN_CURSO")]
    #[serde(rename = "EN_CURSO")]
    EnCurso,
    #[display("TERMINADA")]
    #[serde(rename = "TERMINADA")]
    Terminada,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Programada,
        AppointmentStatus::EnCurso,
        AppointmentStatus::Terminada,
    ];
}

impl FromStr for AppointmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.to_string() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("unknown appointment status: {s}"))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: i64,
    pub scheduled_at: NaiveDateTime,
    pub pet_id: i64,
    pub client_id: i64,
    pub veterinarian_id: i64,
    pub status: AppointmentStatus,
    // display data, filled by joins
    pub pet_name: String,
    pub client_username: String,
    pub veterinarian_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_stored_names() {
        assert_eq!(
            "EN_CURSO".parse::<AppointmentStatus>().ok(),
            Some(AppointmentStatus::EnCurso)
        );
        assert_eq!(
            "TERMINADA".parse::<AppointmentStatus>().ok(),
            Some(AppointmentStatus::Terminada)
        );
        assert!("CANCELADA".parse::<AppointmentStatus>().is_err());
    }
}
