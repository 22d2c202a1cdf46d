use crate::models;

/// Identity cookie data stored (encrypt) on user side
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct WebAppSession {
    pub user: models::user_app::User,
}

impl WebAppSession {
    pub fn is_admin(&self) -> bool {
        self.user.has_role(models::user_app::Role::Admin)
    }

    pub fn is_client(&self) -> bool {
        self.user.has_role(models::user_app::Role::Usuario)
    }
}
