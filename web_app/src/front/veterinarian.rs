//! `/veterinario` area: the logged veterinarian's agenda and prescriptions.

use ntex::web;
use serde_json::json;

use crate::{
    api,
    front::{AppState, errors, forms, middleware, utils},
    models,
};

/// Appointment assigned to the logged veterinarian, `Forbidden` otherwise
async fn get_assigned_appointment(
    app_state: &AppState,
    veterinarian_id: i64,
    appointment_id: i64,
) -> Result<models::appointment::Appointment, web::Error> {
    let appointment = api::appointment::get_appointment(&app_state.repo, appointment_id)
        .await
        .map_err(|e| errors::from_api_error(e, "at /veterinario/citas"))?;

    if appointment.veterinarian_id != veterinarian_id {
        return Err(errors::UserError::Forbidden.into());
    }

    Ok(appointment)
}

#[web::get("")]
async fn get_veterinarian_view(
    middleware::logged_user::VeterinarianAccess(session, veterinarian_id): middleware::logged_user::VeterinarianAccess,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "veterinarian": api::veterinarian::get_veterinarian(&app_state.repo, veterinarian_id)
            .await
            .map_err(|e| errors::from_api_error(e, "at /veterinario"))?,
        "appointments": api::appointment::list_appointments_for_veterinarian(
            &app_state.repo,
            veterinarian_id,
        )
        .await
        .map_err(|e| errors::from_api_error(e, "at /veterinario listing appointments"))?,
    }))
    .unwrap_or_default();

    utils::render("vet/panel.html", &context)
}

#[web::get("/citas/{appointment_id}")]
async fn get_appointment_view(
    middleware::logged_user::VeterinarianAccess(session, veterinarian_id): middleware::logged_user::VeterinarianAccess,
    path: web::types::Path<(i64,)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let appointment = get_assigned_appointment(&app_state, veterinarian_id, path.0).await?;

    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "statuses": models::appointment::AppointmentStatus::ALL,
        "prescriptions": api::prescription::list_prescriptions_for_pet(
            &app_state.repo,
            appointment.pet_id,
        )
        .await
        .map_err(|e| errors::from_api_error(e, "at /veterinario/citas/{id}"))?
        .into_iter()
        .filter(|p| p.appointment_id == appointment.id)
        .collect::<Vec<_>>(),
        "appointment": appointment,
    }))
    .unwrap_or_default();

    utils::render("vet/appointment.html", &context)
}

#[web::post("/citas/{appointment_id}/estado")]
async fn change_appointment_status(
    middleware::logged_user::VeterinarianAccess(_, veterinarian_id): middleware::logged_user::VeterinarianAccess,
    _: middleware::csrf_token::CsrfToken,
    path: web::types::Path<(i64,)>,
    form: web::types::Form<forms::appointment::AppointmentStatusForm>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let appointment = get_assigned_appointment(&app_state, veterinarian_id, path.0).await?;

    api::appointment::change_appointment_status(&app_state.repo, appointment.id, &form.status)
        .await
        .map_err(|e| errors::from_api_error(e, "at /veterinario/citas/{id}/estado"))?;

    utils::redirect_to(&format!("/veterinario/citas/{}", appointment.id))
}

#[web::get("/prescribir/{appointment_id}")]
async fn get_prescription_form(
    middleware::logged_user::VeterinarianAccess(session, veterinarian_id): middleware::logged_user::VeterinarianAccess,
    path: web::types::Path<(i64,)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let appointment = get_assigned_appointment(&app_state, veterinarian_id, path.0).await?;

    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "appointment": appointment,
        "products": api::product::list_products(&app_state.repo)
            .await
            .map_err(|e| errors::from_api_error(e, "at /veterinario/prescribir"))?,
    }))
    .unwrap_or_default();

    utils::render("vet/prescription_form.html", &context)
}

/// Issues the prescription and closes the appointment in one step.
#[web::post("/prescribir/{appointment_id}")]
async fn prescribe(
    middleware::logged_user::VeterinarianAccess(_, veterinarian_id): middleware::logged_user::VeterinarianAccess,
    _: middleware::csrf_token::CsrfToken,
    path: web::types::Path<(i64,)>,
    form: web::types::Form<forms::prescription::PrescriptionForm>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let appointment = get_assigned_appointment(&app_state, veterinarian_id, path.0).await?;

    api::prescription::prescribe_and_complete(
        &app_state.repo,
        form.into_inner().into_request(appointment.id),
    )
    .await
    .map_err(|e| errors::from_api_error(e, "at /veterinario/prescribir"))?;

    utils::redirect_to(&format!("/veterinario/citas/{}", appointment.id))
}
