//! Login, self registration and logout.

use ntex::web;
use ntex_identity::Identity;
use serde_json::json;

use crate::{
    api::{self, errors::ClinicError},
    front::{AppState, errors, forms, middleware, session, utils},
    models,
};

fn render_login(error: Option<&str>) -> Result<web::HttpResponse, web::Error> {
    let status = if error.is_some() {
        ntex::http::StatusCode::UNAUTHORIZED
    } else {
        ntex::http::StatusCode::OK
    };

    utils::render_with_status(
        status,
        "login.html",
        &tera::Context::from_value(json!({ "error": error })).unwrap_or_default(),
    )
}

fn render_register(username: &str, error: Option<&str>) -> Result<web::HttpResponse, web::Error> {
    let status = if error.is_some() {
        ntex::http::StatusCode::BAD_REQUEST
    } else {
        ntex::http::StatusCode::OK
    };

    utils::render_with_status(
        status,
        "register.html",
        &tera::Context::from_value(json!({ "username": username, "error": error }))
            .unwrap_or_default(),
    )
}

/// Keeps the user in the identity cookie and opens a csrf protected session.
fn start_session(
    user: models::user_app::User,
    app_state: &AppState,
    identity: &Identity,
    cookie: &ntex_session::Session,
) -> Result<web::HttpResponse, web::Error> {
    utils::set_csrf_token_pair(app_state, cookie)?;

    let home_path = user.home_path();
    identity.remember(serde_json::to_string(&session::WebAppSession { user })?);

    utils::redirect_to(home_path)
}

#[web::get("/login")]
async fn get_login_view(req: web::HttpRequest) -> Result<impl web::Responder, web::Error> {
    if let Some(session) = middleware::logged_user::optional_session(&req) {
        return utils::redirect_to(session.user.home_path());
    }

    render_login(None)
}

#[web::post("/login")]
async fn login(
    form: web::types::Form<forms::user::LoginForm>,
    app_state: web::types::State<AppState>,
    identity: Identity,
    cookie: ntex_session::Session,
) -> Result<impl web::Responder, web::Error> {
    let form = form.into_inner();

    match api::user::authenticate(&app_state.repo, &form.username, &form.password).await {
        Ok(user) => start_session(user, &app_state, &identity, &cookie),
        Err(e) if matches!(e.downcast_ref::<ClinicError>(), Some(ClinicError::Unauthorized(_))) => {
            render_login(Some("usuario o contraseña incorrectos"))
        }
        Err(e) => Err(errors::from_api_error(e, "at /login")),
    }
}

#[web::get("/registro")]
async fn get_register_view() -> Result<impl web::Responder, web::Error> {
    render_register("", None)
}

/// Creates a client account and logs it in. Correctable failures re-render
/// the form with the message.
#[web::post("/registro")]
async fn register(
    form: web::types::Form<forms::user::RegisterForm>,
    app_state: web::types::State<AppState>,
    identity: Identity,
    cookie: ntex_session::Session,
) -> Result<impl web::Responder, web::Error> {
    let form = form.into_inner();
    if !form.passwords_match() {
        return render_register(&form.username, Some("las contraseñas no coinciden"));
    }

    match api::user::register_user(&app_state.repo, &form.username, &form.password).await {
        Ok(user) => start_session(user, &app_state, &identity, &cookie),
        Err(e) => match errors::form_error_message(&e) {
            Some(msg) => render_register(&form.username, Some(&msg)),
            None => Err(errors::from_api_error(e, "at /registro")),
        },
    }
}

#[web::post("/logout")]
async fn logout(
    _: middleware::csrf_token::CsrfToken,
    identity: Identity,
    cookie: ntex_session::Session,
) -> Result<impl web::Responder, web::Error> {
    identity.forget();
    cookie.clear();

    utils::redirect_to("/")
}
