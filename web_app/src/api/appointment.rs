//! # Appointment API Module
//!
//! Scheduling and status changes. A (pet, time) and a (veterinarian, time)
//! slot can each be booked once; the checks here are a fast path, the
//! storage UNIQUE constraints settle races.

use crate::{api::errors::ClinicError, metric, models, repo};
use chrono::{Local, NaiveDateTime};
use log::{info, warn};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScheduleAppointmentRequest {
    pub client_id: i64,
    pub pet_id: i64,
    pub veterinarian_id: i64,
    pub scheduled_at: NaiveDateTime,
}

/// Books an appointment in PROGRAMADA status.
///
/// # Errors
/// - `InvalidInput` if `scheduled_at` is in the past
/// - `NotFound` if the pet, client or veterinarian does not exist (checked in that order)
/// - `Conflict` if the pet or the veterinarian is already booked at that time
/// - `ConfigurationError` if PROGRAMADA is not seeded
pub async fn schedule_appointment(
    repo: &repo::ImplAppRepo,
    request: ScheduleAppointmentRequest,
) -> anyhow::Result<models::appointment::Appointment> {
    let _span = logfire::span!("schedule_appointment").entered();

    if request.scheduled_at < Local::now().naive_local() {
        return Err(ClinicError::invalid_input(
            "la cita no puede agendarse en el pasado",
        ));
    }

    let pet = repo
        .get_pet_by_id(request.pet_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("mascota {}", request.pet_id)))?;
    let client = repo
        .get_user_by_id(request.client_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("usuario {}", request.client_id)))?;
    let veterinarian = repo
        .get_veterinarian_by_id(request.veterinarian_id)
        .await?
        .ok_or_else(|| {
            ClinicError::not_found(format!("veterinario {}", request.veterinarian_id))
        })?;

    if repo
        .exists_appointment_for_pet_at(pet.id, request.scheduled_at)
        .await?
    {
        warn!("pet {} already booked at {}", pet.id, request.scheduled_at);
        metric::incr_appointment_action_statds("conflict_pet");
        return Err(ClinicError::conflict(
            "la mascota ya tiene una cita en esa fecha y hora",
        ));
    }
    if repo
        .exists_appointment_for_veterinarian_at(veterinarian.id, request.scheduled_at)
        .await?
    {
        warn!(
            "veterinarian {} already booked at {}",
            veterinarian.id, request.scheduled_at
        );
        metric::incr_appointment_action_statds("conflict_veterinarian");
        return Err(ClinicError::conflict(
            "el veterinario ya tiene una cita en esa fecha y hora",
        ));
    }

    let status = models::appointment::AppointmentStatus::Programada;
    let status_id = repo
        .get_appointment_status_id(status)
        .await?
        .ok_or_else(|| ClinicError::configuration(format!("status {status} is not seeded")))?;

    let mut appointment = models::appointment::Appointment {
        id: 0,
        scheduled_at: request.scheduled_at,
        pet_id: pet.id,
        client_id: client.id,
        veterinarian_id: veterinarian.id,
        status,
        pet_name: pet.name,
        client_username: client.username,
        veterinarian_name: veterinarian.full_name,
    };
    appointment.id = repo.insert_appointment(&appointment, status_id).await?;

    info!(
        "appointment {} scheduled at {}",
        appointment.id, appointment.scheduled_at
    );
    metric::incr_appointment_action_statds("schedule");
    Ok(appointment)
}

/// Overwrites the status of an appointment. Any status can follow any other.
///
/// # Errors
/// - `NotFound` if the appointment does not exist or `status_name` is not a known status
/// - `ConfigurationError` if the status is known but not seeded
pub async fn change_appointment_status(
    repo: &repo::ImplAppRepo,
    appointment_id: i64,
    status_name: &str,
) -> anyhow::Result<models::appointment::Appointment> {
    let mut appointment = get_appointment(repo, appointment_id).await?;

    let status = status_name
        .parse::<models::appointment::AppointmentStatus>()
        .map_err(|_| ClinicError::not_found(format!("estado {status_name}")))?;
    let status_id = repo
        .get_appointment_status_id(status)
        .await?
        .ok_or_else(|| ClinicError::configuration(format!("status {status} is not seeded")))?;

    repo.update_appointment_status(appointment_id, status_id)
        .await?;
    appointment.status = status;

    info!("appointment {appointment_id} moved to {status}");
    metric::incr_appointment_action_statds("change_status");
    Ok(appointment)
}

pub async fn get_appointment(
    repo: &repo::ImplAppRepo,
    appointment_id: i64,
) -> anyhow::Result<models::appointment::Appointment> {
    repo.get_appointment_by_id(appointment_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("cita {appointment_id}")))
}

pub async fn list_appointments_for_client(
    repo: &repo::ImplAppRepo,
    client_id: i64,
) -> anyhow::Result<Vec<models::appointment::Appointment>> {
    repo.list_appointments_by_client(client_id).await
}

pub async fn list_appointments_for_veterinarian(
    repo: &repo::ImplAppRepo,
    veterinarian_id: i64,
) -> anyhow::Result<Vec<models::appointment::Appointment>> {
    repo.list_appointments_by_veterinarian(veterinarian_id)
        .await
}

pub async fn list_appointments_for_pet(
    repo: &repo::ImplAppRepo,
    pet_id: i64,
) -> anyhow::Result<Vec<models::appointment::Appointment>> {
    repo.list_appointments_by_pet(pet_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MockAppRepo;
    use chrono::Duration;
    use mockall::predicate::*;

    fn future_slot() -> NaiveDateTime {
        (Local::now() + Duration::days(2)).naive_local()
    }

    fn request_at(scheduled_at: NaiveDateTime) -> ScheduleAppointmentRequest {
        ScheduleAppointmentRequest {
            client_id: 1,
            pet_id: 2,
            veterinarian_id: 3,
            scheduled_at,
        }
    }

    /// Repo where the client, pet and veterinarian of [`request_at`] exist.
    fn mock_repo_with_entities() -> MockAppRepo {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_pet_by_id().with(eq(2)).returning(|id| {
            Ok(Some(models::pet::Pet {
                id,
                owner_id: 1,
                name: "Toby".into(),
                ..Default::default()
            }))
        });
        mock_repo.expect_get_user_by_id().with(eq(1)).returning(|id| {
            Ok(Some(models::user_app::User {
                id,
                ..models::user_app::User::create_default_from_username("ana", "hash".into())
            }))
        });
        mock_repo
            .expect_get_veterinarian_by_id()
            .with(eq(3))
            .returning(|id| {
                Ok(Some(models::veterinarian::Veterinarian {
                    id,
                    full_name: "Dr. Soto".into(),
                    ..Default::default()
                }))
            });
        mock_repo
    }

    #[ntex::test]
    async fn test_schedule_appointment_free_slot() {
        let scheduled_at = future_slot();
        let mut mock_repo = mock_repo_with_entities();
        mock_repo
            .expect_exists_appointment_for_pet_at()
            .with(eq(2), eq(scheduled_at))
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_exists_appointment_for_veterinarian_at()
            .with(eq(3), eq(scheduled_at))
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_get_appointment_status_id()
            .with(eq(models::appointment::AppointmentStatus::Programada))
            .returning(|_| Ok(Some(1)));
        mock_repo
            .expect_insert_appointment()
            .withf(move |appointment, status_id| {
                appointment.scheduled_at == scheduled_at && *status_id == 1
            })
            .times(1)
            .returning(|_, _| Ok(30));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let appointment = schedule_appointment(&mock_repo, request_at(scheduled_at))
            .await
            .unwrap();

        assert_eq!(appointment.id, 30);
        assert_eq!(
            appointment.status,
            models::appointment::AppointmentStatus::Programada
        );
        assert_eq!(appointment.pet_name, "Toby");
        assert_eq!(appointment.veterinarian_name, "Dr. Soto");
    }

    #[ntex::test]
    async fn test_schedule_appointment_in_the_past() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_insert_appointment().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let yesterday = (Local::now() - Duration::days(1)).naive_local();
        let err = schedule_appointment(&mock_repo, request_at(yesterday))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::InvalidInput(_))
        ));
    }

    #[ntex::test]
    async fn test_schedule_appointment_pet_already_booked() {
        let mut mock_repo = mock_repo_with_entities();
        mock_repo
            .expect_exists_appointment_for_pet_at()
            .returning(|_, _| Ok(true));
        mock_repo.expect_insert_appointment().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = schedule_appointment(&mock_repo, request_at(future_slot()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::Conflict(_))
        ));
    }

    #[ntex::test]
    async fn test_schedule_appointment_veterinarian_already_booked() {
        let mut mock_repo = mock_repo_with_entities();
        mock_repo
            .expect_exists_appointment_for_pet_at()
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_exists_appointment_for_veterinarian_at()
            .returning(|_, _| Ok(true));
        mock_repo.expect_insert_appointment().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = schedule_appointment(&mock_repo, request_at(future_slot()))
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ClinicError>(),
            Some(&ClinicError::Conflict(
                "el veterinario ya tiene una cita en esa fecha y hora".into()
            ))
        );
    }

    #[ntex::test]
    async fn test_schedule_appointment_unknown_veterinarian() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_pet_by_id()
            .returning(|id| Ok(Some(models::pet::Pet { id, ..Default::default() })));
        mock_repo.expect_get_user_by_id().returning(|id| {
            Ok(Some(models::user_app::User {
                id,
                ..models::user_app::User::create_default_from_username("ana", "hash".into())
            }))
        });
        mock_repo
            .expect_get_veterinarian_by_id()
            .returning(|_| Ok(None));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = schedule_appointment(&mock_repo, request_at(future_slot()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::NotFound(_))
        ));
    }

    #[ntex::test]
    async fn test_schedule_appointment_missing_status_is_configuration_error() {
        let mut mock_repo = mock_repo_with_entities();
        mock_repo
            .expect_exists_appointment_for_pet_at()
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_exists_appointment_for_veterinarian_at()
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_get_appointment_status_id()
            .returning(|_| Ok(None));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = schedule_appointment(&mock_repo, request_at(future_slot()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::ConfigurationError(_))
        ));
    }

    #[ntex::test]
    async fn test_change_appointment_status_unknown_name() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_appointment_by_id()
            .returning(|id| {
                Ok(Some(models::appointment::Appointment {
                    id,
                    ..Default::default()
                }))
            });
        mock_repo.expect_update_appointment_status().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = change_appointment_status(&mock_repo, 1, "CANCELADA")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::NotFound(_))
        ));
    }

    #[ntex::test]
    async fn test_change_appointment_status_any_transition() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_appointment_by_id()
            .returning(|id| {
                Ok(Some(models::appointment::Appointment {
                    id,
                    status: models::appointment::AppointmentStatus::Terminada,
                    ..Default::default()
                }))
            });
        mock_repo
            .expect_get_appointment_status_id()
            .with(eq(models::appointment::AppointmentStatus::EnCurso))
            .returning(|_| Ok(Some(2)));
        mock_repo
            .expect_update_appointment_status()
            .with(eq(6), eq(2))
            .times(1)
            .returning(|_, _| Ok(()));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let appointment = change_appointment_status(&mock_repo, 6, "EN_CURSO")
            .await
            .unwrap();

        assert_eq!(
            appointment.status,
            models::appointment::AppointmentStatus::EnCurso
        );
    }

    #[ntex::test]
    async fn test_get_appointment_not_found() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_appointment_by_id()
            .returning(|_| Ok(None));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        assert!(
            get_appointment(&mock_repo, 77)
                .await
                .is_err_and(|err| matches!(
                    err.downcast_ref::<ClinicError>(),
                    Some(ClinicError::NotFound(_))
                ))
        );
    }
}
