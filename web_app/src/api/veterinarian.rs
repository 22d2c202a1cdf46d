use crate::{api::errors::ClinicError, metric, models, repo};
use log::info;

pub async fn list_veterinarians(
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<Vec<models::veterinarian::Veterinarian>> {
    repo.list_veterinarians().await
}

pub async fn get_veterinarian(
    repo: &repo::ImplAppRepo,
    veterinarian_id: i64,
) -> anyhow::Result<models::veterinarian::Veterinarian> {
    repo.get_veterinarian_by_id(veterinarian_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("veterinario {veterinarian_id}")))
}

/// Veterinarian linked to a login account, used to scope the veterinarian panel.
pub async fn get_veterinarian_for_account(
    repo: &repo::ImplAppRepo,
    user_id: i64,
) -> anyhow::Result<models::veterinarian::Veterinarian> {
    repo.get_veterinarian_by_user_id(user_id)
        .await?
        .ok_or_else(|| {
            ClinicError::not_found(format!("la cuenta {user_id} no tiene veterinario vinculado"))
        })
}

/// Registers a veterinarian that has no login account.
pub async fn register_veterinarian(
    repo: &repo::ImplAppRepo,
    full_name: &str,
    specialty: &str,
) -> anyhow::Result<models::veterinarian::Veterinarian> {
    let full_name = ammonia::clean(full_name.trim());
    if full_name.is_empty() {
        return Err(ClinicError::invalid_input("el nombre es obligatorio"));
    }

    let mut veterinarian = models::veterinarian::Veterinarian {
        id: 0,
        full_name,
        specialty: ammonia::clean(specialty.trim()),
        user_app_id: None,
    };
    veterinarian.id = repo.insert_veterinarian(&veterinarian).await?;

    info!("veterinarian registered: {}", veterinarian.id);
    metric::incr_user_action_statds("register_veterinarian");
    Ok(veterinarian)
}
