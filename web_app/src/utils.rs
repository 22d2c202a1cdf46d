//! Helper functions could be used in api/, front/, ...

use crate::config;
use anyhow::{Context, anyhow};
use argon2::Argon2;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use std::str::FromStr;
use uuid::Uuid;

/// Opens the clinic database. With `encrypted` the SQLCipher key is applied.
pub async fn setup_sqlite_db_pool(encrypted: bool) -> anyhow::Result<SqlitePool> {
    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;

    let options = SqliteConnectOptions::from_str(&app_config.db_host)?.pragma("foreign_keys", "ON");
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

/// Derives a 32 byte key from two UUID strings with Argon2.
pub fn build_csrf_key(pwd: &str, salt: &str) -> anyhow::Result<[u8; 32]> {
    let mut csrf_key = [0u8; 32];
    Argon2::default()
        .hash_password_into(
            Uuid::from_str(pwd)?.as_bytes(),
            Uuid::from_str(salt)?.as_bytes(),
            &mut csrf_key,
        )
        .map_err(|err| anyhow!("csrf_key couldn't be created: {}", err))?;

    Ok(csrf_key)
}

/// Key valid for this process only, used for session and identity cookies.
pub fn build_random_key() -> anyhow::Result<[u8; 32]> {
    build_csrf_key(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string())
}
