//! # API Module
//!
//! Domain services of the clinic. Every function takes the repository as
//! [`crate::repo::ImplAppRepo`] and returns `anyhow::Result`; domain failures
//! travel as [`errors::ClinicError`].
//!
//! ## Modules
//!
//! - [`appointment`] - Scheduling and appointment status
//! - [`errors`] - Typed domain failures
//! - [`pet`] - Pet registration and lookups
//! - [`prescription`] - Prescriptions and their payment
//! - [`product`] - Product catalog and stock
//! - [`user`] - Accounts, authentication and role assignment
//! - [`veterinarian`] - Veterinarian listing and registration

pub mod appointment;
pub mod errors;
pub mod pet;
pub mod prescription;
pub mod product;
pub mod user;
pub mod veterinarian;

#[cfg(test)]
mod tests {
    use super::errors::ClinicError;
    use super::*;
    use crate::{
        models::{appointment::AppointmentStatus, user_app::Role},
        repo::{self, sqlite::tests::setup_test_repo},
    };
    use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    struct Clinic {
        repo: repo::ImplAppRepo,
        client_id: i64,
        pet_id: i64,
        veterinarian_id: i64,
    }

    async fn open_clinic() -> Clinic {
        let repo: repo::ImplAppRepo = Box::new(setup_test_repo(true).await);

        let client = user::register_user(&repo, "cliente", "secreto123")
            .await
            .unwrap();
        let pet = pet::register_pet(
            &repo,
            client.id,
            pet::NewPet {
                name: "Canela".into(),
                species: "perro".into(),
                breed: "beagle".into(),
                birth_date: NaiveDate::from_ymd_opt(2019, 8, 20).unwrap(),
            },
        )
        .await
        .unwrap();
        let veterinarian = veterinarian::register_veterinarian(&repo, "Dr. Vega", "general")
            .await
            .unwrap();

        Clinic {
            repo,
            client_id: client.id,
            pet_id: pet.id,
            veterinarian_id: veterinarian.id,
        }
    }

    fn tomorrow_at(hour: u32) -> NaiveDateTime {
        (Local::now() + Duration::days(1))
            .date_naive()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    async fn schedule(clinic: &Clinic, pet_id: i64, veterinarian_id: i64, at: NaiveDateTime) -> anyhow::Result<i64> {
        appointment::schedule_appointment(
            &clinic.repo,
            appointment::ScheduleAppointmentRequest {
                client_id: clinic.client_id,
                pet_id,
                veterinarian_id,
                scheduled_at: at,
            },
        )
        .await
        .map(|appointment| appointment.id)
    }

    fn is_conflict(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<ClinicError>(), Some(ClinicError::Conflict(_)))
    }

    #[ntex::test]
    async fn test_double_booking_is_rejected_for_pet_and_veterinarian() {
        let clinic = open_clinic().await;
        let other_vet = veterinarian::register_veterinarian(&clinic.repo, "Dra. Paz", "general")
            .await
            .unwrap();
        let other_pet = pet::register_pet(
            &clinic.repo,
            clinic.client_id,
            pet::NewPet {
                name: "Nube".into(),
                species: "gato".into(),
                breed: "persa".into(),
                birth_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            },
        )
        .await
        .unwrap();
        let at = tomorrow_at(9);

        let appointment_id = schedule(&clinic, clinic.pet_id, clinic.veterinarian_id, at)
            .await
            .unwrap();
        let stored = appointment::get_appointment(&clinic.repo, appointment_id)
            .await
            .unwrap();
        assert_eq!(stored.status, AppointmentStatus::Programada);

        // same pet, different veterinarian
        let err = schedule(&clinic, clinic.pet_id, other_vet.id, at)
            .await
            .unwrap_err();
        assert!(is_conflict(&err));

        // same veterinarian, different pet
        let err = schedule(&clinic, other_pet.id, clinic.veterinarian_id, at)
            .await
            .unwrap_err();
        assert!(is_conflict(&err));

        assert!(
            schedule(&clinic, other_pet.id, other_vet.id, at)
                .await
                .is_ok()
        );
        assert_eq!(
            appointment::list_appointments_for_client(&clinic.repo, clinic.client_id)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[ntex::test]
    async fn test_paying_prescriptions_decrements_stock_once_and_clamps() {
        let clinic = open_clinic().await;
        let product = product::register_product(
            &clinic.repo,
            product::NewProduct {
                name: "Doxiciclina".into(),
                description: "tabletas 100mg".into(),
                price: dec!(89.90),
                stock: 10,
            },
        )
        .await
        .unwrap();
        let appointment_id = schedule(&clinic, clinic.pet_id, clinic.veterinarian_id, tomorrow_at(11))
            .await
            .unwrap();

        let first = prescription::create_prescription(
            &clinic.repo,
            prescription::PrescriptionRequest {
                appointment_id,
                product_id: product.id,
                quantity: 4,
                instructions: "una tableta diaria".into(),
            },
        )
        .await
        .unwrap();

        for _ in 0..2 {
            let paid = prescription::mark_prescription_paid(&clinic.repo, first.id)
                .await
                .unwrap();
            assert!(paid.paid);
        }
        assert_eq!(
            product::get_product(&clinic.repo, product.id)
                .await
                .unwrap()
                .stock,
            6
        );

        let second = prescription::create_prescription(
            &clinic.repo,
            prescription::PrescriptionRequest {
                appointment_id,
                product_id: product.id,
                quantity: 8,
                instructions: "dos tabletas diarias".into(),
            },
        )
        .await
        .unwrap();
        prescription::mark_prescription_paid(&clinic.repo, second.id)
            .await
            .unwrap();

        assert_eq!(
            product::get_product(&clinic.repo, product.id)
                .await
                .unwrap()
                .stock,
            0
        );
        assert_eq!(
            prescription::list_prescriptions_for_pet(&clinic.repo, clinic.pet_id)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[ntex::test]
    async fn test_decrement_for_payment_over_stock_stores_zero() {
        let clinic = open_clinic().await;
        let product = product::register_product(
            &clinic.repo,
            product::NewProduct {
                name: "Collar isabelino".into(),
                description: "talla M".into(),
                price: dec!(150),
                stock: 3,
            },
        )
        .await
        .unwrap();

        let updated = product::decrement_for_payment(&clinic.repo, product.id, 5)
            .await
            .unwrap();

        assert_eq!(updated.stock, 0);
        assert_eq!(
            product::get_product(&clinic.repo, product.id)
                .await
                .unwrap()
                .stock,
            0
        );
    }

    #[ntex::test]
    async fn test_prescribe_and_complete_closes_appointment() {
        let clinic = open_clinic().await;
        let product = product::register_product(
            &clinic.repo,
            product::NewProduct {
                name: "Desparasitante".into(),
                description: "dosis unica".into(),
                price: dec!(60),
                stock: 5,
            },
        )
        .await
        .unwrap();
        let appointment_id = schedule(&clinic, clinic.pet_id, clinic.veterinarian_id, tomorrow_at(16))
            .await
            .unwrap();

        let issued = prescription::prescribe_and_complete(
            &clinic.repo,
            prescription::PrescriptionRequest {
                appointment_id,
                product_id: product.id,
                quantity: 1,
                instructions: "administrar en ayunas".into(),
            },
        )
        .await
        .unwrap();

        let appointment = appointment::get_appointment(&clinic.repo, appointment_id)
            .await
            .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Terminada);

        let stored = prescription::get_prescription(&clinic.repo, issued.id)
            .await
            .unwrap();
        assert!(!stored.paid);
        assert_eq!(stored.pet_id, clinic.pet_id);
        assert_eq!(stored.veterinarian_id, clinic.veterinarian_id);
    }

    #[ntex::test]
    async fn test_register_and_promote_account() {
        let clinic = open_clinic().await;

        let err = user::register_user(&clinic.repo, "cliente", "otraclave1")
            .await
            .unwrap_err();
        assert!(is_conflict(&err));

        let stored = user::find_user_by_username(&clinic.repo, "cliente")
            .await
            .unwrap();
        assert_ne!(stored.password_hash, "secreto123");
        assert!(user::authenticate(&clinic.repo, "cliente", "secreto123").await.is_ok());

        let vet = user::promote_to_veterinarian(&clinic.repo, clinic.client_id, "Ana Cruz", "exoticos")
            .await
            .unwrap();
        let err = user::promote_to_veterinarian(&clinic.repo, clinic.client_id, "Ana Cruz", "exoticos")
            .await
            .unwrap_err();
        assert!(is_conflict(&err));

        let promoted = user::find_user_by_username(&clinic.repo, "cliente")
            .await
            .unwrap();
        assert!(promoted.has_role(Role::Veterinario));
        assert!(promoted.has_role(Role::Usuario));
        assert_eq!(promoted.home_path(), "/veterinario");

        let linked: Vec<_> = veterinarian::list_veterinarians(&clinic.repo)
            .await
            .unwrap()
            .into_iter()
            .filter(|v| v.user_app_id == Some(clinic.client_id))
            .collect();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, vet.id);
        assert_eq!(
            veterinarian::get_veterinarian_for_account(&clinic.repo, clinic.client_id)
                .await
                .unwrap()
                .id,
            vet.id
        );
    }
}
