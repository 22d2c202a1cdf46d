use envconfig::Envconfig;
use std::sync::OnceLock;

#[derive(Envconfig, Clone)]
pub struct AppConfig {
    #[envconfig(default = "local")]
    pub env: String,
    pub db_host: String,
    #[envconfig(default = "")]
    pub db_pass_encrypt: String,
}

impl AppConfig {
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }
}

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Environment config, read on first use.
pub fn app_config() -> anyhow::Result<&'static AppConfig> {
    if let Some(app_config) = APP_CONFIG.get() {
        return Ok(app_config);
    }

    let app_config = AppConfig::init_from_env()?;
    Ok(APP_CONFIG.get_or_init(|| app_config))
}
