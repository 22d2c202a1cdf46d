#[derive(serde::Deserialize, Debug)]
pub struct VeterinarianForm {
    pub full_name: String,
    pub specialty: String,
    /// Account to promote, empty for a veterinarian without login
    #[serde(default)]
    pub user_id: String,
}

impl VeterinarianForm {
    pub fn account_id(&self) -> Option<i64> {
        self.user_id.trim().parse::<i64>().ok()
    }
}
