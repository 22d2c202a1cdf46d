//! # Prescription API Module
//!
//! Prescriptions are issued against an appointment and a product. Paying a
//! prescription is the only path that takes product stock away.

use crate::{api::errors::ClinicError, metric, models, repo};
use chrono::Local;
use log::info;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PrescriptionRequest {
    pub appointment_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub instructions: String,
}

/// Validates the request and builds the unsaved prescription, with pet and
/// veterinarian copied from the appointment.
async fn build_prescription(
    repo: &repo::ImplAppRepo,
    request: PrescriptionRequest,
) -> anyhow::Result<models::prescription::Prescription> {
    if request.quantity == 0 {
        return Err(ClinicError::invalid_input(
            "la cantidad debe ser mayor a cero",
        ));
    }

    let appointment = repo
        .get_appointment_by_id(request.appointment_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("cita {}", request.appointment_id)))?;
    let product = repo
        .get_product_by_id(request.product_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("producto {}", request.product_id)))?;

    Ok(models::prescription::Prescription {
        id: 0,
        appointment_id: appointment.id,
        pet_id: appointment.pet_id,
        veterinarian_id: appointment.veterinarian_id,
        product_id: product.id,
        quantity: request.quantity,
        instructions: ammonia::clean(request.instructions.trim()),
        issued_on: Local::now().date_naive(),
        paid: false,
        product_name: product.name,
    })
}

/// Issues an unpaid prescription. The appointment status is left as is.
///
/// # Errors
/// - `InvalidInput` if quantity is zero
/// - `NotFound` if the appointment or the product does not exist
pub async fn create_prescription(
    repo: &repo::ImplAppRepo,
    request: PrescriptionRequest,
) -> anyhow::Result<models::prescription::Prescription> {
    let mut prescription = build_prescription(repo, request).await?;
    prescription.id = repo.insert_prescription(&prescription).await?;

    info!(
        "prescription {} issued for appointment {}",
        prescription.id, prescription.appointment_id
    );
    metric::incr_prescription_action_statds("create");
    Ok(prescription)
}

/// Issues the prescription and closes its appointment as TERMINADA.
/// Both writes share one transaction.
pub async fn prescribe_and_complete(
    repo: &repo::ImplAppRepo,
    request: PrescriptionRequest,
) -> anyhow::Result<models::prescription::Prescription> {
    let _span = logfire::span!("prescribe_and_complete").entered();

    let mut prescription = build_prescription(repo, request).await?;

    let completed = models::appointment::AppointmentStatus::Terminada;
    let completed_status_id = repo
        .get_appointment_status_id(completed)
        .await?
        .ok_or_else(|| ClinicError::configuration(format!("status {completed} is not seeded")))?;

    prescription.id = repo
        .insert_prescription_completing_appointment(&prescription, completed_status_id)
        .await?;

    info!(
        "prescription {} issued, appointment {} completed",
        prescription.id, prescription.appointment_id
    );
    metric::incr_prescription_action_statds("create");
    metric::incr_appointment_action_statds("complete");
    Ok(prescription)
}

/// Marks the prescription as paid and takes its quantity out of stock.
///
/// Idempotent: paying an already paid prescription returns it unchanged and
/// does not touch the stock again.
pub async fn mark_prescription_paid(
    repo: &repo::ImplAppRepo,
    prescription_id: i64,
) -> anyhow::Result<models::prescription::Prescription> {
    let _span = logfire::span!("mark_prescription_paid").entered();

    let mut prescription = get_prescription(repo, prescription_id).await?;

    if repo.settle_prescription_payment(prescription_id).await? {
        info!(
            "prescription {prescription_id} paid, {} units of product {} taken from stock",
            prescription.quantity, prescription.product_id
        );
        metric::incr_prescription_action_statds("paid");
    } else {
        info!("prescription {prescription_id} was already paid");
    }

    prescription.paid = true;
    Ok(prescription)
}

pub async fn get_prescription(
    repo: &repo::ImplAppRepo,
    prescription_id: i64,
) -> anyhow::Result<models::prescription::Prescription> {
    repo.get_prescription_by_id(prescription_id)
        .await?
        .ok_or_else(|| ClinicError::not_found(format!("prescripcion {prescription_id}")))
}

/// Newest first.
pub async fn list_prescriptions_for_pet(
    repo: &repo::ImplAppRepo,
    pet_id: i64,
) -> anyhow::Result<Vec<models::prescription::Prescription>> {
    repo.list_prescriptions_by_pet(pet_id).await
}
