//! # Inventory API Module
//!
//! Product catalog and stock levels. Stock is unsigned and every decrement
//! clamps at zero, see [`decrement_for_payment`].

use crate::{api::errors::ClinicError, metric, models, repo};
use chrono::Utc;
use log::{info, warn};
use rust_decimal::Decimal;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
}

pub async fn register_product(
    repo: &repo::ImplAppRepo,
    new_product: NewProduct,
) -> anyhow::Result<models::product::Product> {
    let now = Utc::now();
    let mut product = models::product::Product {
        id: 0,
        name: ammonia::clean(new_product.name.trim()),
        description: ammonia::clean(new_product.description.trim()),
        price: new_product.price,
        stock: new_product.stock,
        created_at: now,
        updated_at: now,
    };
    product.id = repo.insert_product(&product).await?;

    info!("product registered: {}", product.id);
    metric::incr_inventory_action_statds("register_product");
    Ok(product)
}

pub async fn list_products(
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<Vec<models::product::Product>> {
    repo.list_products().await
}

pub async fn get_product(
    repo: &repo::ImplAppRepo,
    product_id: i64,
) -> anyhow::Result<models::product::Product> {
    repo.get_product_by_id(product_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("producto {product_id}")))
}

/// Overwrites the stock with an absolute value.
pub async fn adjust_stock(
    repo: &repo::ImplAppRepo,
    product_id: i64,
    new_stock: u32,
) -> anyhow::Result<models::product::Product> {
    let mut product = get_product(repo, product_id).await?;

    repo.set_product_stock(product_id, new_stock).await?;
    product.stock = new_stock;
    product.updated_at = Utc::now();

    info!("product {product_id} stock set to {new_stock}");
    metric::incr_inventory_action_statds("adjust_stock");
    Ok(product)
}

/// Takes `quantity` units out of stock. Asking for more than is available
/// leaves the stock at zero and is not an error.
pub async fn decrement_for_payment(
    repo: &repo::ImplAppRepo,
    product_id: i64,
    quantity: u32,
) -> anyhow::Result<models::product::Product> {
    let mut product = get_product(repo, product_id).await?;

    if quantity > product.stock {
        warn!(
            "product {product_id} stock clamped to 0: requested {quantity}, available {}",
            product.stock
        );
        metric::incr_inventory_action_statds("stock_clamped");
    }

    product.stock = repo
        .decrement_product_stock(product_id, quantity)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("producto {product_id}")))?;
    product.updated_at = Utc::now();

    metric::incr_inventory_action_statds("decrement_stock");
    Ok(product)
}
