pub mod admin;
pub mod auth;
pub mod client;
pub mod errors;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod session;
pub mod templates;
pub mod utils;
pub mod veterinarian;

use crate::repo;
use csrf::AesGcmCsrfProtection;

pub struct AppState {
    pub csrf_protec: AesGcmCsrfProtection,
    pub repo: repo::ImplAppRepo,
}
