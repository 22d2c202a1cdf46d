//! Frontend route configuration module.
//!
//! Routes are grouped by area. Each area's handlers are gated by the role
//! extractor of [super::middleware::logged_user].

use super::{admin, auth, client, server, veterinarian};
use ntex::web;

/// Landing page, login, self registration and logout.
///
/// # Routes
/// - `GET /`
/// - `GET|POST /login`
/// - `GET|POST /registro`
/// - `POST /logout`
pub fn public(cfg: &mut web::ServiceConfig) {
    cfg.service((
        server::serve_favicon,
        server::index,
        auth::get_login_view,
        auth::login,
        auth::get_register_view,
        auth::register,
        auth::logout,
    ));
}

/// Inventory and staff management, role ADMIN.
///
/// # Routes
/// - `GET /admin`
/// - `GET /admin/productos`
/// - `GET|POST /admin/productos/nuevo`
/// - `POST /admin/productos/{id}/stock`
/// - `GET /admin/veterinarios`
/// - `GET|POST /admin/veterinarios/nuevo`
pub fn admin(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin").service((
        admin::get_admin_view,
        admin::get_products_view,
        admin::get_new_product_form,
        admin::create_product,
        admin::adjust_product_stock,
        admin::get_veterinarians_view,
        admin::get_new_veterinarian_form,
        admin::create_veterinarian,
    )));
}

/// Pets, scheduling and prescription payment, role USUARIO.
///
/// # Routes
/// - `GET /usuario`
/// - `GET|POST /usuario/mascotas/nueva`
/// - `GET /usuario/mascotas/{id}`
/// - `GET|POST /usuario/citas/agendar/{pet_id}`
/// - `GET /usuario/prescripciones/{id}`
/// - `POST /usuario/prescripciones/{id}/pagar`
pub fn client(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/usuario").service((
        client::get_client_view,
        client::get_new_pet_form,
        client::create_pet,
        client::get_pet_view,
        client::get_schedule_form,
        client::schedule_appointment,
        client::get_prescription_view,
        client::pay_prescription,
    )));
}

/// Agenda and prescriptions, role VETERINARIO.
///
/// # Routes
/// - `GET /veterinario`
/// - `GET /veterinario/citas/{id}`
/// - `POST /veterinario/citas/{id}/estado`
/// - `GET|POST /veterinario/prescribir/{appointment_id}`
pub fn veterinarian(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/veterinario").service((
        veterinarian::get_veterinarian_view,
        veterinarian::get_appointment_view,
        veterinarian::change_appointment_status,
        veterinarian::get_prescription_form,
        veterinarian::prescribe,
    )));
}
