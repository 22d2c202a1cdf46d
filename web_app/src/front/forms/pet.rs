use crate::{api, consts, front::errors};
use chrono::NaiveDate;

#[derive(serde::Deserialize, Debug)]
pub struct NewPetForm {
    pub name: String,
    pub species: String,
    pub breed: String,
    /// `yyyy-mm-dd` as sent by a date input
    pub birth_date: String,
}

impl TryFrom<NewPetForm> for api::pet::NewPet {
    type Error = errors::UserError;

    fn try_from(form: NewPetForm) -> Result<Self, Self::Error> {
        let birth_date = NaiveDate::parse_from_str(form.birth_date.trim(), consts::DATE_INPUT_FORMAT)
            .map_err(|_| {
                errors::UserError::FormInputValueError("fecha de nacimiento invalida".into())
            })?;

        Ok(api::pet::NewPet {
            name: form.name,
            species: form.species,
            breed: form.breed,
            birth_date,
        })
    }
}
