//! Handlers not linked to a specific area

use ntex::web;
use ntex_files::NamedFile;

use crate::front::{errors, middleware, utils};

/// Serve `favicon.ico`
#[web::get("/favicon.ico")]
async fn serve_favicon() -> Result<impl web::Responder, web::Error> {
    Ok(NamedFile::open("web/static/images/favicon.ico")?)
}

/// Return a [UrlNotFound](errors::UserError::UrlNotFound) error for urls not defined
pub async fn serve_not_found() -> Result<web::HttpResponse, web::Error> {
    Err(errors::UserError::UrlNotFound.into())
}

/// Landing page. Logged users go straight to their area.
#[web::get("/")]
async fn index(req: web::HttpRequest) -> Result<impl web::Responder, web::Error> {
    if let Some(session) = middleware::logged_user::optional_session(&req) {
        return utils::redirect_to(session.user.home_path());
    }

    utils::render("index.html", &tera::Context::new())
}
