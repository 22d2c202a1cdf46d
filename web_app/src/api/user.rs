//! # User API Module
//!
//! Account registration, credential checks and role assignment.

use crate::{api::errors::ClinicError, consts, metric, models, repo};
use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use log::{info, warn};
use uuid::Uuid;

/// Hashes `raw_password` with Argon2id and a per-call random salt.
///
/// # Returns
/// * `anyhow::Result<String>` - PHC formatted hash, never equal to the input
pub fn hash_password(raw_password: &str) -> anyhow::Result<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|err| anyhow!("password salt couldn't be created: {}", err))?;

    Ok(Argon2::default()
        .hash_password(raw_password.as_bytes(), &salt)
        .map_err(|err| anyhow!("password couldn't be hashed: {}", err))?
        .to_string())
}

/// Checks `raw_password` against a stored PHC hash. A malformed hash never verifies.
pub fn verify_password(raw_password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(raw_password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Self-registration of a client account.
///
/// # Arguments
/// * `repo` - Repository instance for database operations
/// * `username` - Desired login name, trimmed before use
/// * `raw_password` - Plaintext password, at least [`consts::MIN_PASSWORD_LEN`] chars
///
/// # Errors
/// - `InvalidInput` on a blank username or a short password
/// - `Conflict` if the username is taken
/// - `ConfigurationError` if the USUARIO role is not seeded
pub async fn register_user(
    repo: &repo::ImplAppRepo,
    username: &str,
    raw_password: &str,
) -> anyhow::Result<models::user_app::User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ClinicError::invalid_input("el nombre de usuario es obligatorio"));
    }
    if raw_password.chars().count() < consts::MIN_PASSWORD_LEN {
        return Err(ClinicError::invalid_input(format!(
            "la contraseña debe tener al menos {} caracteres",
            consts::MIN_PASSWORD_LEN
        )));
    }

    if repo.get_user_by_username(username).await?.is_some() {
        warn!("registration rejected, username taken: {username}");
        return Err(ClinicError::conflict("el nombre de usuario ya esta en uso"));
    }

    let role_id = repo
        .get_role_id(models::user_app::Role::Usuario)
        .await?
        .ok_or_else(|| ClinicError::configuration("role USUARIO is not seeded"))?;

    let mut user =
        models::user_app::User::create_default_from_username(username, hash_password(raw_password)?);
    user.id = repo.insert_user(&user, role_id).await?;

    info!("user registered: {}", user.id);
    metric::incr_user_action_statds("register_user");
    Ok(user)
}

/// Returns the account when `raw_password` verifies.
///
/// Unknown username and wrong password fail the same way, `Unauthorized`.
pub async fn authenticate(
    repo: &repo::ImplAppRepo,
    username: &str,
    raw_password: &str,
) -> anyhow::Result<models::user_app::User> {
    let user = repo.get_user_by_username(username.trim()).await?;

    match user {
        Some(user) if verify_password(raw_password, &user.password_hash) => {
            metric::incr_user_action_statds("login");
            Ok(user)
        }
        _ => {
            metric::incr_user_action_statds("login_failed");
            Err(ClinicError::Unauthorized("usuario o contraseña incorrectos".into()).into())
        }
    }
}

pub async fn find_user_by_username(
    repo: &repo::ImplAppRepo,
    username: &str,
) -> anyhow::Result<models::user_app::User> {
    repo.get_user_by_username(username)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("usuario {username}")))
}

pub async fn get_user(
    repo: &repo::ImplAppRepo,
    user_id: i64,
) -> anyhow::Result<models::user_app::User> {
    repo.get_user_by_id(user_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("usuario {user_id}")))
}

pub async fn list_users(repo: &repo::ImplAppRepo) -> anyhow::Result<Vec<models::user_app::User>> {
    repo.list_users().await
}

/// Grants VETERINARIO to an existing account and creates its linked veterinarian.
///
/// Role link and veterinarian row are written in one transaction. The role
/// is added with set semantics, so it is never duplicated.
///
/// # Errors
/// - `NotFound` if the user does not exist
/// - `Conflict` if a veterinarian already links to the account
/// - `ConfigurationError` if the VETERINARIO role is not seeded
pub async fn promote_to_veterinarian(
    repo: &repo::ImplAppRepo,
    user_id: i64,
    full_name: &str,
    specialty: &str,
) -> anyhow::Result<models::veterinarian::Veterinarian> {
    let _span = logfire::span!("promote_to_veterinarian").entered();

    if repo.get_user_by_id(user_id).await?.is_none() {
        return Err(ClinicError::not_found(format!("usuario {user_id}")));
    }

    if repo.get_veterinarian_by_user_id(user_id).await?.is_some() {
        warn!("user {user_id} is already linked to a veterinarian");
        return Err(ClinicError::conflict(
            "la cuenta ya esta vinculada a un veterinario",
        ));
    }

    let role_id = repo
        .get_role_id(models::user_app::Role::Veterinario)
        .await?
        .ok_or_else(|| ClinicError::configuration("role VETERINARIO is not seeded"))?;

    let mut veterinarian = models::veterinarian::Veterinarian {
        id: 0,
        full_name: ammonia::clean(full_name.trim()),
        specialty: ammonia::clean(specialty.trim()),
        user_app_id: Some(user_id),
    };
    veterinarian.id = repo
        .promote_user_to_veterinarian(user_id, role_id, &veterinarian)
        .await?;

    info!("user {user_id} promoted to veterinarian {}", veterinarian.id);
    metric::incr_user_action_statds("promote_veterinarian");
    Ok(veterinarian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MockAppRepo;
    use mockall::predicate::*;

    fn create_test_user(id: i64, username: &str, raw_password: &str) -> models::user_app::User {
        models::user_app::User {
            id,
            ..models::user_app::User::create_default_from_username(
                username,
                hash_password(raw_password).unwrap(),
            )
        }
    }

    #[test]
    fn test_hash_password_is_salted_and_verifiable() {
        let first = hash_password("secreto123").unwrap();
        let second = hash_password("secreto123").unwrap();

        assert_ne!(first, "secreto123");
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password("secreto123", &first));
        assert!(!verify_password("otra-clave", &first));
        assert!(!verify_password("secreto123", "not-a-phc-string"));
    }

    #[ntex::test]
    async fn test_register_user_new_username() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_user_by_username()
            .with(eq("maria"))
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_get_role_id()
            .with(eq(models::user_app::Role::Usuario))
            .times(1)
            .returning(|_| Ok(Some(2)));
        mock_repo
            .expect_insert_user()
            .withf(|user, role_id| {
                user.username == "maria"
                    && user.password_hash != "secreto123"
                    && verify_password("secreto123", &user.password_hash)
                    && *role_id == 2
            })
            .times(1)
            .returning(|_, _| Ok(7));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let user = register_user(&mock_repo, "  maria ", "secreto123")
            .await
            .unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.username, "maria");
        assert!(user.has_role(models::user_app::Role::Usuario));
        assert_eq!(user.roles.len(), 1);
    }

    #[ntex::test]
    async fn test_register_user_duplicate_username_is_conflict() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_user_by_username()
            .times(1)
            .returning(|_| Ok(Some(create_test_user(1, "maria", "secreto123"))));
        mock_repo.expect_insert_user().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = register_user(&mock_repo, "maria", "secreto123")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::Conflict(_))
        ));
    }

    #[ntex::test]
    async fn test_register_user_rejects_short_password_and_blank_username() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_user_by_username().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        for (username, password) in [("maria", "corta"), ("   ", "secreto123")] {
            let err = register_user(&mock_repo, username, password)
                .await
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ClinicError>(),
                Some(ClinicError::InvalidInput(_))
            ));
        }
    }

    #[ntex::test]
    async fn test_register_user_without_seeded_role_is_configuration_error() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_user_by_username()
            .returning(|_| Ok(None));
        mock_repo.expect_get_role_id().returning(|_| Ok(None));
        mock_repo.expect_insert_user().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = register_user(&mock_repo, "maria", "secreto123")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::ConfigurationError(_))
        ));
    }

    #[ntex::test]
    async fn test_authenticate_checks_password() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_user_by_username()
            .with(eq("maria"))
            .returning(|_| Ok(Some(create_test_user(3, "maria", "secreto123"))));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        assert!(
            authenticate(&mock_repo, "maria", "secreto123")
                .await
                .is_ok_and(|user| user.id == 3)
        );

        let err = authenticate(&mock_repo, "maria", "equivocada")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::Unauthorized(_))
        ));
    }

    #[ntex::test]
    async fn test_authenticate_unknown_user_is_unauthorized() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_user_by_username()
            .returning(|_| Ok(None));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = authenticate(&mock_repo, "nadie", "secreto123")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::Unauthorized(_))
        ));
    }

    #[ntex::test]
    async fn test_find_user_by_username_not_found() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_user_by_username()
            .returning(|_| Ok(None));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = find_user_by_username(&mock_repo, "nadie")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::NotFound(_))
        ));
    }

    #[ntex::test]
    async fn test_promote_to_veterinarian_links_account() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_user_by_id()
            .with(eq(5))
            .returning(|_| Ok(Some(create_test_user(5, "pablo", "secreto123"))));
        mock_repo
            .expect_get_veterinarian_by_user_id()
            .with(eq(5))
            .returning(|_| Ok(None));
        mock_repo
            .expect_get_role_id()
            .with(eq(models::user_app::Role::Veterinario))
            .returning(|_| Ok(Some(3)));
        mock_repo
            .expect_promote_user_to_veterinarian()
            .withf(|user_id, role_id, vet| {
                *user_id == 5
                    && *role_id == 3
                    && vet.user_app_id == Some(5)
                    && vet.full_name == "Pablo Diaz"
            })
            .times(1)
            .returning(|_, _, _| Ok(11));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let vet = promote_to_veterinarian(&mock_repo, 5, " Pablo Diaz ", "felinos")
            .await
            .unwrap();

        assert_eq!(vet.id, 11);
        assert_eq!(vet.specialty, "felinos");
    }

    #[ntex::test]
    async fn test_promote_to_veterinarian_twice_is_conflict() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_user_by_id()
            .returning(|_| Ok(Some(create_test_user(5, "pablo", "secreto123"))));
        mock_repo
            .expect_get_veterinarian_by_user_id()
            .returning(|user_id| {
                Ok(Some(models::veterinarian::Veterinarian {
                    id: 11,
                    user_app_id: Some(user_id),
                    ..Default::default()
                }))
            });
        mock_repo.expect_promote_user_to_veterinarian().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = promote_to_veterinarian(&mock_repo, 5, "Pablo", "general")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::Conflict(_))
        ));
    }

    #[ntex::test]
    async fn test_promote_unknown_user_is_not_found() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_user_by_id().returning(|_| Ok(None));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = promote_to_veterinarian(&mock_repo, 99, "Nadie", "general")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::NotFound(_))
        ));
    }
}
