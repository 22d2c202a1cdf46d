//! Application configuration loaded from environment variables.
//!
//! Sensitive fields are marked and must never be logged.

use anyhow::{Context, anyhow};
use envconfig::Envconfig;
use std::sync::OnceLock;

#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app
    /// Values: "local", "dev", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Database host value
    /// Example: "sqlite:data/clinic.db"
    pub db_host: String,

    /// SENSITIVE: key used by SQLCipher to encrypt the database in prod
    #[envconfig(default = "")]
    pub db_pass_encrypt: String,

    /// Host address for web server binding
    /// Example: "0.0.0.0", "localhost"
    #[envconfig(default = "localhost")]
    pub wep_server_host: String,

    #[envconfig(default = "8080")]
    pub wep_server_port: u16,

    /// SENSITIVE PATH: TLS private key, prod only
    #[envconfig(default = "server.key")]
    pub private_key_path: String,

    /// TLS certificate, prod only
    #[envconfig(default = "server.crt")]
    pub certificate_path: String,

    /// SENSITIVE: CSRF protection password (UUID format)
    pub csrf_pass: String,

    /// SENSITIVE: CSRF protection salt (UUID format)
    pub csrf_salt: String,

    /// SENSITIVE: logfire write token. Without it logs go to stdout.
    pub logfire_token: Option<String>,
}

impl AppConfig {
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    pub fn url_host(&self) -> String {
        if self.is_prod() {
            return self.wep_server_host.to_string();
        }

        format!(
            "{host}:{port}",
            host = self.wep_server_host,
            port = self.wep_server_port
        )
    }
}

pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Reads the environment once. Later calls are no-ops.
pub fn init_config() -> anyhow::Result<()> {
    if APP_CONFIG.get().is_some() {
        return Ok(());
    }

    let app_config = AppConfig::init_from_env()
        .context("failed to load app config, check environment variables")?;

    APP_CONFIG
        .set(app_config)
        .map_err(|_| anyhow!("app config was already initialized"))
}
