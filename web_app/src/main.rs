//! # Vet Clinic Web Application
//!
//! Entry point of the clinic web app: clients book appointments for their
//! pets, veterinarians prescribe products and admins keep the inventory.
//! Configures SSL, cookies, cryptographic keys, and route handling.

#![recursion_limit = "256"]

pub mod api;
pub mod config;
pub mod consts;
pub mod front;
pub mod logger;
pub mod metric;
pub mod models;
pub mod repo;
pub mod utils;

use anyhow::Context;
use csrf::AesGcmCsrfProtection;
use logfire::config::MetricsOptions;
use ntex::web;
use ntex_identity::{CookieIdentityPolicy, IdentityService};
use ntex_session::CookieSession;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    config::init_config()?;

    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;

    // logfire when a token is configured, stdout otherwise
    let shutdown_handler = match &app_config.logfire_token {
        Some(token) => Some(
            logfire::configure()
                .install_panic_handler()
                .with_metrics(Some(MetricsOptions::default()))
                .send_to_logfire(logfire::config::SendToLogfire::Yes)
                .with_token(token)
                .finish()?,
        ),
        None => {
            logger::setup_simple_logger()?;
            None
        }
    };

    let sqlite_repo = repo::sqlite::SqlxSqliteRepo {
        db_pool: utils::setup_sqlite_db_pool(app_config.is_prod()).await?,
    };

    // csrf key is stable across restarts, cookie keys live with the process
    let csrf_key = utils::build_csrf_key(&app_config.csrf_pass, &app_config.csrf_salt)?;
    let session_key = utils::build_random_key()?;
    let identity_key = utils::build_random_key()?;

    log::info!("starting vet clinic at {}", app_config.url_host());

    configure_and_run_server(csrf_key, session_key, identity_key, sqlite_repo).await?;

    if let Some(shutdown_handler) = shutdown_handler {
        shutdown_handler.shutdown()?;
    }

    Ok(())
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor() -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;
    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

fn create_app_state(csrf_key: [u8; 32], sqlite_repo: repo::sqlite::SqlxSqliteRepo) -> front::AppState {
    front::AppState {
        csrf_protec: AesGcmCsrfProtection::from_key(csrf_key),
        repo: Box::new(sqlite_repo),
    }
}

async fn configure_and_run_server(
    csrf_key: [u8; 32],
    session_key: [u8; 32],
    identity_key: [u8; 32],
    sqlite_repo: repo::sqlite::SqlxSqliteRepo,
) -> anyhow::Result<()> {
    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;
    let server_addr = ("0.0.0.0", app_config.wep_server_port);

    let server = web::server(move || {
        web::App::new()
            .wrap(
                CookieSession::private(&session_key)
                    .secure(app_config.is_prod())
                    .domain(app_config.wep_server_host.to_string())
                    .max_age(consts::MAX_AGE_COOKIES)
                    .name(consts::SESSION_COOKIE_NAME),
            )
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(&identity_key)
                    .name(consts::IDENTITY_COOKIE_NAME)
                    .domain(app_config.wep_server_host.to_string())
                    .max_age(consts::MAX_AGE_COOKIES)
                    .secure(app_config.is_prod()),
            ))
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(csrf_key, sqlite_repo.clone()))
            .configure(front::routes::public)
            .configure(front::routes::admin)
            .configure(front::routes::client)
            .configure(front::routes::veterinarian)
            .service(ntex_files::Files::new("/static", "web/static/"))
            .default_service(web::route().to(front::server::serve_not_found))
    });

    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor()?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
