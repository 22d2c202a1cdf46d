#[derive(serde::Deserialize, Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(serde::Deserialize, Debug)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegisterForm {
    pub fn passwords_match(&self) -> bool {
        self.password == self.password_confirm
    }
}
