use std::str::FromStr;

use crate::{api::errors::ClinicError, models, repo::sqlite_queries};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, Row, SqlitePool, sqlite::SqliteRow};

use super::AppRepo;

#[derive(Clone)]
pub struct SqlxSqliteRepo {
    pub db_pool: SqlitePool,
}

impl FromRow<'_, SqliteRow> for models::user_app::User {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            roles: models::user_app::User::parse_roles(
                row.try_get::<Option<String>, &str>("roles")?.as_deref(),
            ),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::product::Product {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let price = Decimal::from_str(row.try_get::<&str, &str>("price")?).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "price".into(),
                source: Box::new(e),
            }
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price,
            stock: row.try_get("stock")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Turns a UNIQUE constraint failure into a [ClinicError::Conflict] with `msg`,
/// any other error passes through.
fn unique_violation_as_conflict(err: sqlx::Error, msg: &str) -> anyhow::Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return ClinicError::conflict(msg);
        }
    }

    err.into()
}

fn appointment_slot_conflict(err: sqlx::Error) -> anyhow::Error {
    let msg = match &err {
        sqlx::Error::Database(db_err) if db_err.message().contains("appointment.pet_id") => {
            "la mascota ya tiene una cita en esa fecha y hora"
        }
        _ => "el veterinario ya tiene una cita en esa fecha y hora",
    };

    unique_violation_as_conflict(err, msg)
}

#[async_trait]
impl AppRepo for SqlxSqliteRepo {
    async fn get_user_by_id(&self, user_id: i64) -> anyhow::Result<Option<models::user_app::User>> {
        Ok(
            sqlx::query_as::<_, models::user_app::User>(sqlite_queries::QUERY_GET_USER_APP_BY_ID)
                .bind(user_id)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> anyhow::Result<Option<models::user_app::User>> {
        Ok(sqlx::query_as::<_, models::user_app::User>(
            sqlite_queries::QUERY_GET_USER_APP_BY_USERNAME,
        )
        .bind(username)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn list_users(&self) -> anyhow::Result<Vec<models::user_app::User>> {
        Ok(
            sqlx::query_as::<_, models::user_app::User>(sqlite_queries::QUERY_GET_ALL_USER_APP)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn insert_user(
        &self,
        user: &models::user_app::User,
        role_id: i64,
    ) -> anyhow::Result<i64> {
        let mut transaction = self.db_pool.begin().await?;

        let user_id = sqlx::query(sqlite_queries::QUERY_INSERT_USER_APP)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&mut *transaction)
            .await
            .map_err(|e| unique_violation_as_conflict(e, "el nombre de usuario ya esta en uso"))?
            .last_insert_rowid();

        sqlx::query(sqlite_queries::QUERY_LINK_USER_ROLE)
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        Ok(user_id)
    }

    async fn get_role_id(&self, role: models::user_app::Role) -> anyhow::Result<Option<i64>> {
        Ok(sqlx::query_scalar(sqlite_queries::QUERY_GET_ROLE_ID)
            .bind(role.to_string())
            .fetch_optional(&self.db_pool)
            .await?)
    }

    async fn promote_user_to_veterinarian(
        &self,
        user_id: i64,
        role_id: i64,
        veterinarian: &models::veterinarian::Veterinarian,
    ) -> anyhow::Result<i64> {
        let mut transaction = self.db_pool.begin().await?;

        sqlx::query(sqlite_queries::QUERY_LINK_USER_ROLE)
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *transaction)
            .await?;

        sqlx::query("UPDATE user_app SET updated_at = $2 WHERE id = $1;")
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *transaction)
            .await?;

        let veterinarian_id = sqlx::query(sqlite_queries::QUERY_INSERT_VETERINARIAN)
            .bind(&veterinarian.full_name)
            .bind(&veterinarian.specialty)
            .bind(user_id)
            .execute(&mut *transaction)
            .await
            .map_err(|e| {
                unique_violation_as_conflict(e, "la cuenta ya esta vinculada a un veterinario")
            })?
            .last_insert_rowid();

        transaction.commit().await?;

        Ok(veterinarian_id)
    }

    async fn get_veterinarian_by_id(
        &self,
        veterinarian_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::Veterinarian>> {
        Ok(sqlx::query_as::<_, models::veterinarian::Veterinarian>(
            sqlite_queries::QUERY_GET_VETERINARIAN_BY_ID,
        )
        .bind(veterinarian_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn get_veterinarian_by_user_id(
        &self,
        user_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::Veterinarian>> {
        Ok(sqlx::query_as::<_, models::veterinarian::Veterinarian>(
            sqlite_queries::QUERY_GET_VETERINARIAN_BY_USER_ID,
        )
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn list_veterinarians(&self) -> anyhow::Result<Vec<models::veterinarian::Veterinarian>> {
        Ok(sqlx::query_as::<_, models::veterinarian::Veterinarian>(
            sqlite_queries::QUERY_GET_ALL_VETERINARIANS,
        )
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn insert_veterinarian(
        &self,
        veterinarian: &models::veterinarian::Veterinarian,
    ) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_VETERINARIAN)
            .bind(&veterinarian.full_name)
            .bind(&veterinarian.specialty)
            .bind(veterinarian.user_app_id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| {
                unique_violation_as_conflict(e, "la cuenta ya esta vinculada a un veterinario")
            })?
            .last_insert_rowid())
    }

    async fn get_pet_by_id(&self, pet_id: i64) -> anyhow::Result<Option<models::pet::Pet>> {
        Ok(
            sqlx::query_as::<_, models::pet::Pet>(sqlite_queries::QUERY_GET_PET_BY_ID)
                .bind(pet_id)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn list_pets_by_owner(&self, owner_id: i64) -> anyhow::Result<Vec<models::pet::Pet>> {
        Ok(
            sqlx::query_as::<_, models::pet::Pet>(sqlite_queries::QUERY_GET_ALL_PETS_OWNER_ID)
                .bind(owner_id)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn insert_pet(&self, pet: &models::pet::Pet) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_PET)
            .bind(pet.owner_id)
            .bind(&pet.name)
            .bind(&pet.species)
            .bind(&pet.breed)
            .bind(pet.birth_date)
            .bind(pet.created_at)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn get_appointment_status_id(
        &self,
        status: models::appointment::AppointmentStatus,
    ) -> anyhow::Result<Option<i64>> {
        Ok(
            sqlx::query_scalar(sqlite_queries::QUERY_GET_APPOINTMENT_STATUS_ID)
                .bind(status.to_string())
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn get_appointment_by_id(
        &self,
        appointment_id: i64,
    ) -> anyhow::Result<Option<models::appointment::Appointment>> {
        Ok(sqlx::query_as::<_, models::appointment::Appointment>(
            sqlite_queries::QUERY_GET_APPOINTMENT_BY_ID,
        )
        .bind(appointment_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn list_appointments_by_client(
        &self,
        client_id: i64,
    ) -> anyhow::Result<Vec<models::appointment::Appointment>> {
        Ok(sqlx::query_as::<_, models::appointment::Appointment>(
            sqlite_queries::QUERY_GET_APPOINTMENTS_BY_CLIENT,
        )
        .bind(client_id)
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn list_appointments_by_veterinarian(
        &self,
        veterinarian_id: i64,
    ) -> anyhow::Result<Vec<models::appointment::Appointment>> {
        Ok(sqlx::query_as::<_, models::appointment::Appointment>(
            sqlite_queries::QUERY_GET_APPOINTMENTS_BY_VETERINARIAN,
        )
        .bind(veterinarian_id)
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn list_appointments_by_pet(
        &self,
        pet_id: i64,
    ) -> anyhow::Result<Vec<models::appointment::Appointment>> {
        Ok(sqlx::query_as::<_, models::appointment::Appointment>(
            sqlite_queries::QUERY_GET_APPOINTMENTS_BY_PET,
        )
        .bind(pet_id)
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn exists_appointment_for_pet_at(
        &self,
        pet_id: i64,
        scheduled_at: NaiveDateTime,
    ) -> anyhow::Result<bool> {
        Ok(
            sqlx::query_scalar(sqlite_queries::QUERY_EXISTS_APPOINTMENT_PET_AT)
                .bind(pet_id)
                .bind(scheduled_at)
                .fetch_one(&self.db_pool)
                .await?,
        )
    }

    async fn exists_appointment_for_veterinarian_at(
        &self,
        veterinarian_id: i64,
        scheduled_at: NaiveDateTime,
    ) -> anyhow::Result<bool> {
        Ok(
            sqlx::query_scalar(sqlite_queries::QUERY_EXISTS_APPOINTMENT_VETERINARIAN_AT)
                .bind(veterinarian_id)
                .bind(scheduled_at)
                .fetch_one(&self.db_pool)
                .await?,
        )
    }

    async fn insert_appointment(
        &self,
        appointment: &models::appointment::Appointment,
        status_id: i64,
    ) -> anyhow::Result<i64> {
        let now = Utc::now();

        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_APPOINTMENT)
            .bind(appointment.scheduled_at)
            .bind(appointment.pet_id)
            .bind(appointment.client_id)
            .bind(appointment.veterinarian_id)
            .bind(status_id)
            .bind(now)
            .bind(now)
            .execute(&self.db_pool)
            .await
            .map_err(appointment_slot_conflict)?
            .last_insert_rowid())
    }

    async fn update_appointment_status(
        &self,
        appointment_id: i64,
        status_id: i64,
    ) -> anyhow::Result<()> {
        Ok(
            sqlx::query(sqlite_queries::QUERY_UPDATE_APPOINTMENT_STATUS)
                .bind(appointment_id)
                .bind(status_id)
                .bind(Utc::now())
                .execute(&self.db_pool)
                .await
                .map(|_| ())?,
        )
    }

    async fn get_product_by_id(
        &self,
        product_id: i64,
    ) -> anyhow::Result<Option<models::product::Product>> {
        Ok(
            sqlx::query_as::<_, models::product::Product>(sqlite_queries::QUERY_GET_PRODUCT_BY_ID)
                .bind(product_id)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn list_products(&self) -> anyhow::Result<Vec<models::product::Product>> {
        Ok(
            sqlx::query_as::<_, models::product::Product>(sqlite_queries::QUERY_GET_ALL_PRODUCTS)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn insert_product(&self, product: &models::product::Product) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_PRODUCT)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.to_string())
            .bind(product.stock)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn set_product_stock(&self, product_id: i64, stock: u32) -> anyhow::Result<()> {
        Ok(sqlx::query(sqlite_queries::QUERY_SET_PRODUCT_STOCK)
            .bind(product_id)
            .bind(stock)
            .bind(Utc::now())
            .execute(&self.db_pool)
            .await
            .map(|_| ())?)
    }

    async fn decrement_product_stock(
        &self,
        product_id: i64,
        quantity: u32,
    ) -> anyhow::Result<Option<u32>> {
        Ok(
            sqlx::query_scalar::<_, u32>(sqlite_queries::QUERY_DECREMENT_PRODUCT_STOCK)
                .bind(product_id)
                .bind(quantity)
                .bind(Utc::now())
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn get_prescription_by_id(
        &self,
        prescription_id: i64,
    ) -> anyhow::Result<Option<models::prescription::Prescription>> {
        Ok(sqlx::query_as::<_, models::prescription::Prescription>(
            sqlite_queries::QUERY_GET_PRESCRIPTION_BY_ID,
        )
        .bind(prescription_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn list_prescriptions_by_pet(
        &self,
        pet_id: i64,
    ) -> anyhow::Result<Vec<models::prescription::Prescription>> {
        Ok(sqlx::query_as::<_, models::prescription::Prescription>(
            sqlite_queries::QUERY_GET_PRESCRIPTIONS_BY_PET,
        )
        .bind(pet_id)
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn insert_prescription(
        &self,
        prescription: &models::prescription::Prescription,
    ) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_PRESCRIPTION)
            .bind(prescription.appointment_id)
            .bind(prescription.pet_id)
            .bind(prescription.veterinarian_id)
            .bind(prescription.product_id)
            .bind(prescription.quantity)
            .bind(&prescription.instructions)
            .bind(prescription.issued_on)
            .bind(prescription.paid)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn insert_prescription_completing_appointment(
        &self,
        prescription: &models::prescription::Prescription,
        completed_status_id: i64,
    ) -> anyhow::Result<i64> {
        let mut transaction = self.db_pool.begin().await?;

        let prescription_id = sqlx::query(sqlite_queries::QUERY_INSERT_PRESCRIPTION)
            .bind(prescription.appointment_id)
            .bind(prescription.pet_id)
            .bind(prescription.veterinarian_id)
            .bind(prescription.product_id)
            .bind(prescription.quantity)
            .bind(&prescription.instructions)
            .bind(prescription.issued_on)
            .bind(prescription.paid)
            .execute(&mut *transaction)
            .await?
            .last_insert_rowid();

        sqlx::query(sqlite_queries::QUERY_UPDATE_APPOINTMENT_STATUS)
            .bind(prescription.appointment_id)
            .bind(completed_status_id)
            .bind(Utc::now())
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        Ok(prescription_id)
    }

    async fn settle_prescription_payment(&self, prescription_id: i64) -> anyhow::Result<bool> {
        let mut transaction = self.db_pool.begin().await?;

        let Some((product_id, quantity)) =
            sqlx::query_as::<_, (i64, u32)>(sqlite_queries::QUERY_MARK_PRESCRIPTION_PAID)
                .bind(prescription_id)
                .bind(Utc::now())
                .fetch_optional(&mut *transaction)
                .await?
        else {
            // already paid (or missing): nothing to settle
            transaction.rollback().await?;
            return Ok(false);
        };

        sqlx::query(sqlite_queries::QUERY_DECREMENT_PRODUCT_STOCK)
            .bind(product_id)
            .bind(quantity)
            .bind(Utc::now())
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        Ok(true)
    }
}
