use crate::config;
use anyhow::anyhow;
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use std::str::FromStr;
use uuid::Uuid;

/// Renders `file_name` from `migrations/` and runs every statement in it.
pub async fn run_migrations(db_pool: &SqlitePool, file_name: &str) -> anyhow::Result<()> {
    let tera = tera::Tera::new("../migrations/**/*.sql")?;
    let migration = tera.render(file_name, &tera::Context::new())?;

    sqlx::raw_sql(&migration).execute(db_pool).await?;
    println!("migration {file_name} applied");

    Ok(())
}

/// Inserts an account holding the ADMIN role. Reference data must be seeded first.
pub async fn create_admin(
    db_pool: &SqlitePool,
    username: &str,
    password: &str,
) -> anyhow::Result<i64> {
    let username = username.trim();
    if username.is_empty() || password.chars().count() < 8 {
        anyhow::bail!("username is required and password needs at least 8 characters");
    }

    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| anyhow!("salt couldnt be created: {e}"))?;
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password couldnt be hashed: {e}"))?
        .to_string();

    let now = chrono::Utc::now();
    let mut transaction = db_pool.begin().await?;

    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO user_app(username, password_hash, created_at, updated_at)
        VALUES ($1, $2, $3, $3) RETURNING id",
    )
    .bind(username)
    .bind(password_hash)
    .bind(now)
    .fetch_one(&mut *transaction)
    .await?;

    let inserted = sqlx::query(
        "INSERT INTO user_role(user_id, role_id) SELECT $1, id FROM role WHERE name = 'ADMIN'",
    )
    .bind(user_id)
    .execute(&mut *transaction)
    .await?
    .rows_affected();

    if inserted == 0 {
        anyhow::bail!("role ADMIN not found, run seed_reference_data.sql first");
    }

    transaction.commit().await?;
    println!("admin {username} created with id {user_id}");

    Ok(user_id)
}

pub async fn setup_sqlite_db_pool(encrypted: bool) -> anyhow::Result<SqlitePool> {
    let app_config = config::app_config()?;
    let options = SqliteConnectOptions::from_str(&app_config.db_host)?
        .create_if_missing(true)
        .pragma("foreign_keys", "ON");

    if encrypted {
        return Ok(SqlitePool::connect_with(
            options
                .pragma("key", app_config.db_pass_encrypt.clone())
                .pragma("cipher_page_size", "1024")
                .pragma("kdf_iter", "64000")
                .pragma("cipher_hmac_algorithm", "HMAC_SHA1")
                .pragma("cipher_kdf_algorithm", "PBKDF2_HMAC_SHA1")
                .journal_mode(SqliteJournalMode::Delete),
        )
        .await?);
    }

    Ok(SqlitePool::connect_with(options).await?)
}
