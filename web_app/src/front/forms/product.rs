use crate::{api, consts, front::errors};
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(serde::Deserialize, Debug)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: u32,
}

impl TryFrom<ProductForm> for api::product::NewProduct {
    type Error = errors::UserError;

    fn try_from(form: ProductForm) -> Result<Self, Self::Error> {
        let price = Decimal::from_str(form.price.trim())
            .ok()
            .filter(|price| !price.is_sign_negative() && *price <= consts::MAX_PRODUCT_PRICE)
            .ok_or_else(|| errors::UserError::FormInputValueError("precio invalido".into()))?;

        if form.name.trim().is_empty() {
            return Err(errors::UserError::FormInputValueError(
                "el nombre del producto es obligatorio".into(),
            ));
        }

        Ok(api::product::NewProduct {
            name: form.name,
            description: form.description,
            price,
            stock: form.stock,
        })
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct StockForm {
    pub stock: u32,
}
