//! `/admin` area: inventory and veterinarian staff.

use ntex::web;
use serde_json::json;

use crate::{
    api,
    front::{AppState, errors, forms, middleware, utils},
};

#[web::get("")]
async fn get_admin_view(
    middleware::logged_user::AdminAccess(session): middleware::logged_user::AdminAccess,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let products = api::product::list_products(&app_state.repo)
        .await
        .map_err(|e| errors::from_api_error(e, "at /admin listing products"))?;
    let veterinarians = api::veterinarian::list_veterinarians(&app_state.repo)
        .await
        .map_err(|e| errors::from_api_error(e, "at /admin listing veterinarians"))?;

    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "products_count": products.len(),
        "out_of_stock": products.iter().filter(|p| p.stock == 0).collect::<Vec<_>>(),
        "veterinarians_count": veterinarians.len(),
    }))
    .unwrap_or_default();

    utils::render("admin/panel.html", &context)
}

#[web::get("/productos")]
async fn get_products_view(
    middleware::logged_user::AdminAccess(session): middleware::logged_user::AdminAccess,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "products": api::product::list_products(&app_state.repo)
            .await
            .map_err(|e| errors::from_api_error(e, "at /admin/productos"))?,
    }))
    .unwrap_or_default();

    utils::render("admin/products.html", &context)
}

#[web::get("/productos/nuevo")]
async fn get_new_product_form(
    middleware::logged_user::AdminAccess(session): middleware::logged_user::AdminAccess,
) -> Result<impl web::Responder, web::Error> {
    let context = tera::Context::from_value(json!({ "user": &session.user })).unwrap_or_default();

    utils::render("admin/product_form.html", &context)
}

#[web::post("/productos/nuevo")]
async fn create_product(
    _: middleware::logged_user::AdminAccess,
    _: middleware::csrf_token::CsrfToken,
    form: web::types::Form<forms::product::ProductForm>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let new_product = api::product::NewProduct::try_from(form.into_inner())?;

    api::product::register_product(&app_state.repo, new_product)
        .await
        .map_err(|e| errors::from_api_error(e, "at /admin/productos/nuevo"))?;

    utils::redirect_to("/admin/productos")
}

#[web::post("/productos/{product_id}/stock")]
async fn adjust_product_stock(
    _: middleware::logged_user::AdminAccess,
    _: middleware::csrf_token::CsrfToken,
    path: web::types::Path<(i64,)>,
    form: web::types::Form<forms::product::StockForm>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    api::product::adjust_stock(&app_state.repo, path.0, form.stock)
        .await
        .map_err(|e| errors::from_api_error(e, "at /admin/productos/{id}/stock"))?;

    utils::redirect_to("/admin/productos")
}

#[web::get("/veterinarios")]
async fn get_veterinarians_view(
    middleware::logged_user::AdminAccess(session): middleware::logged_user::AdminAccess,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "veterinarians": api::veterinarian::list_veterinarians(&app_state.repo)
            .await
            .map_err(|e| errors::from_api_error(e, "at /admin/veterinarios"))?,
    }))
    .unwrap_or_default();

    utils::render("admin/veterinarians.html", &context)
}

#[web::get("/veterinarios/nuevo")]
async fn get_new_veterinarian_form(
    middleware::logged_user::AdminAccess(session): middleware::logged_user::AdminAccess,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let candidates = api::user::list_users(&app_state.repo)
        .await
        .map_err(|e| errors::from_api_error(e, "at /admin/veterinarios/nuevo"))?
        .into_iter()
        .filter(|u| !u.has_role(crate::models::user_app::Role::Veterinario))
        .collect::<Vec<_>>();

    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "candidates": candidates,
    }))
    .unwrap_or_default();

    utils::render("admin/veterinarian_form.html", &context)
}

/// With an account selected the account is promoted, otherwise a
/// veterinarian without login is registered.
#[web::post("/veterinarios/nuevo")]
async fn create_veterinarian(
    _: middleware::logged_user::AdminAccess,
    _: middleware::csrf_token::CsrfToken,
    form: web::types::Form<forms::veterinarian::VeterinarianForm>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let result = match form.account_id() {
        Some(user_id) => {
            api::user::promote_to_veterinarian(
                &app_state.repo,
                user_id,
                &form.full_name,
                &form.specialty,
            )
            .await
        }
        None => {
            api::veterinarian::register_veterinarian(
                &app_state.repo,
                &form.full_name,
                &form.specialty,
            )
            .await
        }
    };

    result.map_err(|e| errors::from_api_error(e, "at /admin/veterinarios/nuevo"))?;

    utils::redirect_to("/admin/veterinarios")
}
