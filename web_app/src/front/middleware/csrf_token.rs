use base64::{Engine, prelude::BASE64_STANDARD};
use csrf::{AesGcmCsrfProtection, CsrfProtection};
use ntex::{http::Payload, web};
use ntex_session::UserSession;

use crate::{
    consts,
    front::{AppState, errors},
};

/// Csrf token pair kept in the cookie session, base64 encoded.
#[derive(Default, Debug, serde::Serialize, serde::Deserialize)]
pub struct CsrfToken {
    pub token_base64: String,
    pub cookie_base64: String,
}

impl CsrfToken {
    /// New pair valid for [consts::MAX_AGE_COOKIES] seconds
    pub fn issue(csrf_protec: &AesGcmCsrfProtection) -> Result<Self, errors::ServerError> {
        let (token, cookie) = csrf_protec
            .generate_token_pair(None, consts::MAX_AGE_COOKIES)
            .map_err(|e| {
                errors::ServerError::InternalServerError(format!(
                    "cant set token csrf protection: {e}"
                ))
            })?;

        Ok(Self {
            token_base64: token.b64_string(),
            cookie_base64: cookie.b64_string(),
        })
    }

    pub fn is_valid(&self, csrf_protec: &AesGcmCsrfProtection) -> bool {
        let token = BASE64_STANDARD
            .decode(self.token_base64.as_bytes())
            .map(|token| csrf_protec.parse_token(&token));
        let cookie = BASE64_STANDARD
            .decode(self.cookie_base64.as_bytes())
            .map(|cookie| csrf_protec.parse_cookie(&cookie));

        match (token, cookie) {
            (Ok(Ok(token)), Ok(Ok(cookie))) => {
                csrf_protec.verify_token_pair(&token, &cookie).is_ok()
            }
            _ => false,
        }
    }
}

fn is_csrf_valid(req: &web::HttpRequest) -> bool {
    let stored = req
        .get_session()
        .get::<String>(consts::CSRF_TOKEN_COOKIE_NAME);

    match (stored, req.app_state::<AppState>()) {
        (Ok(Some(csrf)), Some(app_state)) => serde_json::from_str::<CsrfToken>(&csrf)
            .map(|csrf| csrf.is_valid(&app_state.csrf_protec))
            .unwrap_or(false),
        _ => false,
    }
}

/// Guard for state changing endpoints of logged users
impl<Err> web::FromRequest<Err> for CsrfToken {
    type Error = web::Error;

    fn from_request(
        req: &web::HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        if !is_csrf_valid(req) {
            return std::future::ready(Err(errors::ServerError::InvalidCsrfToken.into()));
        }

        std::future::ready(Ok(Self::default()))
    }
}
