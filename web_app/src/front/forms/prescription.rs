use crate::api;

#[derive(serde::Deserialize, Debug)]
pub struct PrescriptionForm {
    pub product_id: i64,
    pub quantity: u32,
    pub instructions: String,
}

impl PrescriptionForm {
    pub fn into_request(self, appointment_id: i64) -> api::prescription::PrescriptionRequest {
        api::prescription::PrescriptionRequest {
            appointment_id,
            product_id: self.product_id,
            quantity: self.quantity,
            instructions: self.instructions,
        }
    }
}
