use crate::{consts, front::errors};
use chrono::NaiveDateTime;

#[derive(serde::Deserialize, Debug)]
pub struct ScheduleAppointmentForm {
    pub veterinarian_id: i64,
    /// `yyyy-mm-ddThh:mm` as sent by a datetime-local input
    pub scheduled_at: String,
}

impl ScheduleAppointmentForm {
    pub fn scheduled_at(&self) -> Result<NaiveDateTime, errors::UserError> {
        NaiveDateTime::parse_from_str(self.scheduled_at.trim(), consts::DATETIME_LOCAL_INPUT_FORMAT)
            .map_err(|_| errors::UserError::FormInputValueError("fecha y hora invalidas".into()))
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct AppointmentStatusForm {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_scheduled_at_from_datetime_local_input() {
        let form = ScheduleAppointmentForm {
            veterinarian_id: 1,
            scheduled_at: "2031-02-03T15:30".into(),
        };

        assert_eq!(
            form.scheduled_at().unwrap(),
            NaiveDate::from_ymd_opt(2031, 2, 3)
                .unwrap()
                .and_hms_opt(15, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_scheduled_at_rejects_garbage() {
        let form = ScheduleAppointmentForm {
            veterinarian_id: 1,
            scheduled_at: "mañana".into(),
        };

        assert!(form.scheduled_at().is_err());
    }
}
