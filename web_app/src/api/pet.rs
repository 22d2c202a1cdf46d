//! # Pet API Module
//!
//! Pet registration and ownership-scoped lookups.

use crate::{api::errors::ClinicError, models, repo};
use chrono::{Local, NaiveDate, Utc};
use log::info;

/// Pet data as entered by its owner.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub birth_date: NaiveDate,
}

/// Registers a pet for `owner_id`.
///
/// # Errors
/// - `NotFound` if the owner does not exist
/// - `InvalidInput` on a blank name or a birth date in the future
pub async fn register_pet(
    repo: &repo::ImplAppRepo,
    owner_id: i64,
    new_pet: NewPet,
) -> anyhow::Result<models::pet::Pet> {
    if repo.get_user_by_id(owner_id).await?.is_none() {
        return Err(ClinicError::not_found(format!("usuario {owner_id}")));
    }

    let name = ammonia::clean(new_pet.name.trim());
    if name.is_empty() {
        return Err(ClinicError::invalid_input("el nombre de la mascota es obligatorio"));
    }
    if new_pet.birth_date > Local::now().date_naive() {
        return Err(ClinicError::invalid_input(
            "la fecha de nacimiento no puede estar en el futuro",
        ));
    }

    let mut pet = models::pet::Pet {
        id: 0,
        owner_id,
        name,
        species: ammonia::clean(new_pet.species.trim()),
        breed: ammonia::clean(new_pet.breed.trim()),
        birth_date: new_pet.birth_date,
        created_at: Utc::now(),
    };
    pet.id = repo.insert_pet(&pet).await?;

    info!("pet {} registered for user {owner_id}", pet.id);
    Ok(pet)
}

pub async fn list_pets_for_owner(
    repo: &repo::ImplAppRepo,
    owner_id: i64,
) -> anyhow::Result<Vec<models::pet::Pet>> {
    repo.list_pets_by_owner(owner_id).await
}

pub async fn get_pet(repo: &repo::ImplAppRepo, pet_id: i64) -> anyhow::Result<models::pet::Pet> {
    repo.get_pet_by_id(pet_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("mascota {pet_id}")))
}

/// Like [`get_pet`] but `Forbidden` when the pet belongs to someone else.
pub async fn get_owned_pet(
    repo: &repo::ImplAppRepo,
    owner_id: i64,
    pet_id: i64,
) -> anyhow::Result<models::pet::Pet> {
    let pet = get_pet(repo, pet_id).await?;
    if pet.owner_id != owner_id {
        return Err(ClinicError::Forbidden(format!("mascota {pet_id}")).into());
    }

    Ok(pet)
}
