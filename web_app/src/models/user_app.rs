use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Access level of an account. Stored as rows of the `role` table.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Display,
)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    #[display("ADMIN")]
    Admin,
    #[serde(rename = "USUARIO")]
    #[display("USUARIO")]
    Usuario,
    #[serde(rename = "VETERINARIO")]
    #[display("VETERINARIO")]
    Veterinario,
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ADMIN" => Ok(Role::Admin),
            "USUARIO" => Ok(Role::Usuario),
            "VETERINARIO" => Ok(Role::Veterinario),
            other => anyhow::bail!("unknown role: {other}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn create_default_from_username(username: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username: username.to_string(),
            password_hash,
            roles: BTreeSet::from([Role::Usuario]),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Landing area after login. Admin wins over veterinarian, which wins over client.
    pub fn home_path(&self) -> &'static str {
        if self.has_role(Role::Admin) {
            return "/admin";
        }
        if self.has_role(Role::Veterinario) {
            return "/veterinario";
        }
        "/usuario"
    }

    /// Parses the comma separated role names produced by `GROUP_CONCAT`.
    pub fn parse_roles(raw: Option<&str>) -> BTreeSet<Role> {
        raw.unwrap_or_default()
            .split(',')
            .filter_map(|name| name.parse::<Role>().ok())
            .collect()
    }
}
