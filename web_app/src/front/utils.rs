use ntex::web;

use crate::{
    consts,
    front::{AppState, errors, middleware, templates},
};

/// [ntext responder](ntex::web::HttpResponse) to redirect to `url`
pub fn redirect_to(url: &str) -> Result<web::HttpResponse, web::Error> {
    Ok(web::HttpResponse::Found()
        .header("location", url)
        .finish())
}

/// Renders `template_name` as an html response with `status`
pub fn render_with_status(
    status: ntex::http::StatusCode,
    template_name: &str,
    context: &tera::Context,
) -> Result<web::HttpResponse, web::Error> {
    let content = templates::WEB_TEMPLATES
        .render(template_name, context)
        .map_err(|e| {
            errors::ServerError::TemplateError(format!(
                "template {template_name} couldnt be rendered: {e}"
            ))
        })?;

    Ok(web::HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(content))
}

pub fn render(
    template_name: &str,
    context: &tera::Context,
) -> Result<web::HttpResponse, web::Error> {
    render_with_status(ntex::http::StatusCode::OK, template_name, context)
}

/// Stores a fresh csrf token pair in the cookie session.
/// Every authenticated POST checks it through [middleware::csrf_token::CsrfToken].
pub fn set_csrf_token_pair(
    app_state: &AppState,
    cookie: &ntex_session::Session,
) -> Result<(), web::Error> {
    let csrf = middleware::csrf_token::CsrfToken::issue(&app_state.csrf_protec)?;
    cookie.set(consts::CSRF_TOKEN_COOKIE_NAME, serde_json::to_string(&csrf)?)?;

    Ok(())
}
