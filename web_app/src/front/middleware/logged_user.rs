//! Extractors reading the logged user from the identity cookie.
//!
//! Each area of the app has its own role gated extractor; a handler taking
//! one of them can only run for a logged user holding that role. The
//! veterinarian area is resolved against storage on every request, so a
//! promotion counts without logging in again.

use ntex::{
    http::Payload,
    web::{Error, FromRequest, HttpRequest},
};
use ntex_identity::RequestIdentity;

use crate::{
    front::{AppState, errors, session::WebAppSession},
    repo,
};

/// Logged user of the `/admin` area
pub struct AdminAccess(pub WebAppSession);

/// Logged user of the `/usuario` area
pub struct ClientAccess(pub WebAppSession);

/// Logged user of the `/veterinario` area with its linked veterinarian id
#[derive(Debug)]
pub struct VeterinarianAccess(pub WebAppSession, pub i64);

/// Extracts the [WebAppSession] from a string identity cookie
fn get_logged_session(auth_cookie: Option<String>) -> Result<WebAppSession, errors::UserError> {
    serde_json::from_str::<WebAppSession>(&auth_cookie.unwrap_or_default())
        .map_err(|_| errors::UserError::Unauthorized)
}

/// Logged session, if any, for pages that also serve anonymous users
pub fn optional_session(req: &HttpRequest) -> Option<WebAppSession> {
    get_logged_session(req.get_identity()).ok()
}

fn require(
    auth_cookie: Option<String>,
    can_access: impl FnOnce(&WebAppSession) -> bool,
) -> Result<WebAppSession, errors::UserError> {
    let session = get_logged_session(auth_cookie)?;
    if !can_access(&session) {
        return Err(errors::UserError::Forbidden);
    }

    Ok(session)
}

/// Veterinarian linked to the logged account, `Forbidden` without one
async fn resolve_veterinarian(
    repo: &repo::ImplAppRepo,
    session: WebAppSession,
) -> Result<VeterinarianAccess, Error> {
    match repo.get_veterinarian_by_user_id(session.user.id).await {
        Ok(Some(veterinarian)) => Ok(VeterinarianAccess(session, veterinarian.id)),
        Ok(None) => Err(errors::UserError::Forbidden.into()),
        Err(e) => Err(errors::ServerError::InternalServerError(format!(
            "veterinarian of user {} could not be resolved: {e}",
            session.user.id
        ))
        .into()),
    }
}

impl<Err> FromRequest<Err> for WebAppSession {
    type Error = Error;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        futures::future::ready(get_logged_session(req.get_identity()).map_err(Error::from))
    }
}

impl<Err> FromRequest<Err> for AdminAccess {
    type Error = Error;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        futures::future::ready(
            require(req.get_identity(), WebAppSession::is_admin)
                .map(Self)
                .map_err(Error::from),
        )
    }
}

impl<Err> FromRequest<Err> for ClientAccess {
    type Error = Error;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        futures::future::ready(
            require(req.get_identity(), WebAppSession::is_client)
                .map(Self)
                .map_err(Error::from),
        )
    }
}

impl<Err> FromRequest<Err> for VeterinarianAccess {
    type Error = Error;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        let req = req.clone();

        async move {
            let session = get_logged_session(req.get_identity())?;
            let app_state = req.app_state::<AppState>().ok_or_else(|| {
                errors::ServerError::InternalServerError("app state is not configured".into())
            })?;

            resolve_veterinarian(&app_state.repo, session).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            user_app::{Role, User},
            veterinarian::Veterinarian,
        },
        repo::MockAppRepo,
    };
    use mockall::predicate::*;

    fn session_for(roles: &[Role]) -> WebAppSession {
        let mut user = User::create_default_from_username("ana", "hash".into());
        user.id = 7;
        user.roles = roles.iter().copied().collect();

        WebAppSession { user }
    }

    fn cookie_for(roles: &[Role]) -> Option<String> {
        serde_json::to_string(&session_for(roles)).ok()
    }

    #[test]
    fn test_missing_or_garbage_cookie_is_unauthorized() {
        assert_eq!(
            get_logged_session(None).unwrap_err(),
            errors::UserError::Unauthorized
        );
        assert_eq!(
            get_logged_session(Some("{not json".into())).unwrap_err(),
            errors::UserError::Unauthorized
        );
    }

    #[test]
    fn test_role_gate() {
        let client_cookie = cookie_for(&[Role::Usuario]);

        assert!(require(client_cookie.clone(), WebAppSession::is_client).is_ok());
        assert_eq!(
            require(client_cookie, WebAppSession::is_admin).unwrap_err(),
            errors::UserError::Forbidden
        );
    }

    #[ntex::test]
    async fn test_veterinarian_resolved_from_storage() {
        // promoted after login: the cookie still holds only USUARIO
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_veterinarian_by_user_id()
            .with(eq(7))
            .times(1)
            .returning(|user_id| {
                Ok(Some(Veterinarian {
                    id: 3,
                    full_name: "Ana Ruiz".into(),
                    specialty: "general".into(),
                    user_app_id: Some(user_id),
                }))
            });
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let access = resolve_veterinarian(&mock_repo, session_for(&[Role::Usuario]))
            .await
            .unwrap();

        assert_eq!(access.1, 3);
        assert_eq!(access.0.user.id, 7);
    }

    #[ntex::test]
    async fn test_account_without_veterinarian_is_rejected() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_veterinarian_by_user_id()
            .returning(|_| Ok(None));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        assert!(
            resolve_veterinarian(&mock_repo, session_for(&[Role::Veterinario]))
                .await
                .is_err()
        );
    }

    #[test]
    fn test_session_cookie_never_carries_password_hash() {
        let cookie = cookie_for(&[Role::Usuario]).unwrap();
        assert!(!cookie.contains("password_hash"));

        let session = get_logged_session(Some(cookie)).unwrap();
        assert!(session.user.password_hash.is_empty());
    }
}
