use super::templates;
use crate::api::errors::{ClinicError, as_clinic_error};
use derive_more::{Display, Error};
use log::{error, warn};
use ntex::{http, web};

#[derive(Debug, Display, Error, PartialEq)]
pub enum UserError {
    UrlNotFound,
    Unauthorized,
    Forbidden,
    ResourceNotFound(#[error(not(source))] String),
    Conflict(#[error(not(source))] String),
    FormInputValueError(#[error(not(source))] String),
    InvalidCredentials(#[error(not(source))] String),
}

impl web::error::WebResponseError for UserError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        let mut context = tera::Context::new();
        warn!("{:#?}", self);

        let template_name = match self {
            UserError::UrlNotFound => {
                context.insert("msg_details", "recurso no encontrado");
                "errors/not_found.html"
            }
            UserError::ResourceNotFound(msg) => {
                context.insert("msg_details", &format!("no encontrado: {msg}"));
                "errors/not_found.html"
            }
            UserError::Unauthorized => {
                context.insert("msg_details", "favor de iniciar sesion");
                "errors/need_login.html"
            }
            UserError::InvalidCredentials(msg) => {
                context.insert("msg_details", msg);
                "errors/need_login.html"
            }
            UserError::Forbidden => {
                context.insert("msg_details", "no tiene permiso para ver este recurso");
                "errors/forbidden.html"
            }
            UserError::Conflict(msg) => {
                context.insert("msg_details", msg);
                "errors/invalid_input_values.html"
            }
            UserError::FormInputValueError(msg) => {
                context.insert(
                    "msg_details",
                    &format!("formulario con valores invalidos: {msg}"),
                );
                "errors/invalid_input_values.html"
            }
        };

        web::HttpResponse::build(self.status_code())
            .set_header("content-type", "text/html; charset=utf-8")
            .body(
                templates::WEB_TEMPLATES
                    .render(template_name, &context)
                    .unwrap_or(self.to_string()),
            )
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            UserError::UrlNotFound | UserError::ResourceNotFound(_) => http::StatusCode::NOT_FOUND,
            UserError::Unauthorized | UserError::InvalidCredentials(_) => {
                http::StatusCode::UNAUTHORIZED
            }
            UserError::Forbidden => http::StatusCode::FORBIDDEN,
            UserError::Conflict(_) => http::StatusCode::CONFLICT,
            UserError::FormInputValueError(_) => http::StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ServerError {
    TemplateError(#[error(not(source))] String),
    InternalServerError(#[error(not(source))] String),
    InvalidCsrfToken,
}

impl ServerError {
    fn get_error_message(&self) -> String {
        match self {
            ServerError::TemplateError(msg) => format!("[TemplateError] {:#?}", msg),
            ServerError::InternalServerError(msg) => format!("[InternalServerError] {:#?}", msg),
            ServerError::InvalidCsrfToken => "[InvalidCsrfToken]".to_string(),
        }
    }
}

impl web::error::WebResponseError for ServerError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        error!("{}", self.get_error_message());

        web::HttpResponse::build(self.status_code())
            .set_header("content-type", "text/html; charset=utf-8")
            .body(
                templates::WEB_TEMPLATES
                    .render("errors/internal_error.html", &tera::Context::new())
                    .unwrap_or(self.to_string()),
            )
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            ServerError::InvalidCsrfToken => http::StatusCode::FORBIDDEN,
            _ => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Maps a domain failure to the response the user sees.
/// `ConfigurationError` and untyped errors become a 500.
pub fn from_api_error(err: anyhow::Error, at: &str) -> web::Error {
    match as_clinic_error(&err) {
        Some(ClinicError::NotFound(msg)) => UserError::ResourceNotFound(msg.to_string()).into(),
        Some(ClinicError::Conflict(msg)) => UserError::Conflict(msg.to_string()).into(),
        Some(ClinicError::InvalidInput(msg)) => {
            UserError::FormInputValueError(msg.to_string()).into()
        }
        Some(ClinicError::Unauthorized(msg)) => {
            UserError::InvalidCredentials(msg.to_string()).into()
        }
        Some(ClinicError::Forbidden(_)) => UserError::Forbidden.into(),
        Some(ClinicError::ConfigurationError(_)) | None => {
            ServerError::InternalServerError(format!("{at}: {err}")).into()
        }
    }
}

/// Message to show back in a form, for failures the user can correct.
pub fn form_error_message(err: &anyhow::Error) -> Option<String> {
    match as_clinic_error(err) {
        Some(ClinicError::Conflict(msg)) | Some(ClinicError::InvalidInput(msg)) => {
            Some(msg.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_status_codes() {
        use web::error::WebResponseError;

        assert_eq!(
            UserError::ResourceNotFound("cita 1".into()).status_code(),
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            UserError::Conflict("ocupado".into()).status_code(),
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            UserError::FormInputValueError("x".into()).status_code(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(UserError::Forbidden.status_code(), http::StatusCode::FORBIDDEN);
        assert_eq!(
            UserError::InvalidCredentials("x".into()).status_code(),
            http::StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_form_error_message_only_for_correctable_errors() {
        assert_eq!(
            form_error_message(&ClinicError::conflict("la mascota ya tiene cita")).as_deref(),
            Some("la mascota ya tiene cita")
        );
        assert_eq!(
            form_error_message(&ClinicError::invalid_input("fecha pasada")).as_deref(),
            Some("fecha pasada")
        );
        assert!(form_error_message(&ClinicError::not_found("mascota 1")).is_none());
        assert!(form_error_message(&anyhow::anyhow!("disk I/O error")).is_none());
    }
}
