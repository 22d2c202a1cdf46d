pub mod sqlite;
pub mod sqlite_queries;

use crate::models;
use async_trait::async_trait;
use chrono::NaiveDateTime;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppRepo {
    async fn get_user_by_id(&self, user_id: i64) -> anyhow::Result<Option<models::user_app::User>>;

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> anyhow::Result<Option<models::user_app::User>>;

    async fn list_users(&self) -> anyhow::Result<Vec<models::user_app::User>>;

    /// Inserts the user and links it to `role_id` in one transaction.
    /// A taken username is reported as a `Conflict`.
    async fn insert_user(
        &self,
        user: &models::user_app::User,
        role_id: i64,
    ) -> anyhow::Result<i64>;

    async fn get_role_id(&self, role: models::user_app::Role) -> anyhow::Result<Option<i64>>;

    /// Adds `role_id` to the user (no duplicates) and creates the linked
    /// veterinarian in one transaction. An already linked account is a `Conflict`.
    async fn promote_user_to_veterinarian(
        &self,
        user_id: i64,
        role_id: i64,
        veterinarian: &models::veterinarian::Veterinarian,
    ) -> anyhow::Result<i64>;

    async fn get_veterinarian_by_id(
        &self,
        veterinarian_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::Veterinarian>>;

    async fn get_veterinarian_by_user_id(
        &self,
        user_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::Veterinarian>>;

    async fn list_veterinarians(&self) -> anyhow::Result<Vec<models::veterinarian::Veterinarian>>;

    async fn insert_veterinarian(
        &self,
        veterinarian: &models::veterinarian::Veterinarian,
    ) -> anyhow::Result<i64>;

    async fn get_pet_by_id(&self, pet_id: i64) -> anyhow::Result<Option<models::pet::Pet>>;

    async fn list_pets_by_owner(&self, owner_id: i64) -> anyhow::Result<Vec<models::pet::Pet>>;

    async fn insert_pet(&self, pet: &models::pet::Pet) -> anyhow::Result<i64>;

    async fn get_appointment_status_id(
        &self,
        status: models::appointment::AppointmentStatus,
    ) -> anyhow::Result<Option<i64>>;

    async fn get_appointment_by_id(
        &self,
        appointment_id: i64,
    ) -> anyhow::Result<Option<models::appointment::Appointment>>;

    async fn list_appointments_by_client(
        &self,
        client_id: i64,
    ) -> anyhow::Result<Vec<models::appointment::Appointment>>;

    async fn list_appointments_by_veterinarian(
        &self,
        veterinarian_id: i64,
    ) -> anyhow::Result<Vec<models::appointment::Appointment>>;

    async fn list_appointments_by_pet(
        &self,
        pet_id: i64,
    ) -> anyhow::Result<Vec<models::appointment::Appointment>>;

    async fn exists_appointment_for_pet_at(
        &self,
        pet_id: i64,
        scheduled_at: NaiveDateTime,
    ) -> anyhow::Result<bool>;

    async fn exists_appointment_for_veterinarian_at(
        &self,
        veterinarian_id: i64,
        scheduled_at: NaiveDateTime,
    ) -> anyhow::Result<bool>;

    /// A taken (pet, time) or (veterinarian, time) slot is reported as a `Conflict`.
    async fn insert_appointment(
        &self,
        appointment: &models::appointment::Appointment,
        status_id: i64,
    ) -> anyhow::Result<i64>;

    async fn update_appointment_status(
        &self,
        appointment_id: i64,
        status_id: i64,
    ) -> anyhow::Result<()>;

    async fn get_product_by_id(
        &self,
        product_id: i64,
    ) -> anyhow::Result<Option<models::product::Product>>;

    async fn list_products(&self) -> anyhow::Result<Vec<models::product::Product>>;

    async fn insert_product(&self, product: &models::product::Product) -> anyhow::Result<i64>;

    async fn set_product_stock(&self, product_id: i64, stock: u32) -> anyhow::Result<()>;

    /// Takes `quantity` units out of stock, clamping at zero.
    /// Returns the stored stock, `None` if the product does not exist.
    async fn decrement_product_stock(
        &self,
        product_id: i64,
        quantity: u32,
    ) -> anyhow::Result<Option<u32>>;

    async fn get_prescription_by_id(
        &self,
        prescription_id: i64,
    ) -> anyhow::Result<Option<models::prescription::Prescription>>;

    async fn list_prescriptions_by_pet(
        &self,
        pet_id: i64,
    ) -> anyhow::Result<Vec<models::prescription::Prescription>>;

    async fn insert_prescription(
        &self,
        prescription: &models::prescription::Prescription,
    ) -> anyhow::Result<i64>;

    /// Inserts the prescription and moves its appointment to `completed_status_id`
    /// in one transaction.
    async fn insert_prescription_completing_appointment(
        &self,
        prescription: &models::prescription::Prescription,
        completed_status_id: i64,
    ) -> anyhow::Result<i64>;

    /// Flips `paid` to true and, only when it was false, decrements the product
    /// stock by the prescribed quantity. One transaction. Returns whether this
    /// call performed the flip.
    async fn settle_prescription_payment(&self, prescription_id: i64) -> anyhow::Result<bool>;
}

pub type ImplAppRepo = Box<dyn AppRepo>;
