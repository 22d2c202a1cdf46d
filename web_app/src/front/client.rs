//! `/usuario` area: a client's pets, their appointments and prescriptions.

use ntex::web;
use serde_json::json;

use crate::{
    api,
    consts,
    front::{AppState, errors, forms, middleware, utils},
    models,
};

#[web::get("")]
async fn get_client_view(
    middleware::logged_user::ClientAccess(session): middleware::logged_user::ClientAccess,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let user_id = session.user.id;
    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "pets": api::pet::list_pets_for_owner(&app_state.repo, user_id)
            .await
            .map_err(|e| errors::from_api_error(e, "at /usuario listing pets"))?,
        "appointments": api::appointment::list_appointments_for_client(&app_state.repo, user_id)
            .await
            .map_err(|e| errors::from_api_error(e, "at /usuario listing appointments"))?,
    }))
    .unwrap_or_default();

    utils::render("client/panel.html", &context)
}

#[web::get("/mascotas/nueva")]
async fn get_new_pet_form(
    middleware::logged_user::ClientAccess(session): middleware::logged_user::ClientAccess,
) -> Result<impl web::Responder, web::Error> {
    let context = tera::Context::from_value(json!({ "user": &session.user })).unwrap_or_default();

    utils::render("client/pet_form.html", &context)
}

#[web::post("/mascotas/nueva")]
async fn create_pet(
    middleware::logged_user::ClientAccess(session): middleware::logged_user::ClientAccess,
    _: middleware::csrf_token::CsrfToken,
    form: web::types::Form<forms::pet::NewPetForm>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let new_pet = api::pet::NewPet::try_from(form.into_inner())?;

    let pet = api::pet::register_pet(&app_state.repo, session.user.id, new_pet)
        .await
        .map_err(|e| errors::from_api_error(e, "at /usuario/mascotas/nueva"))?;

    utils::redirect_to(&format!("/usuario/mascotas/{}", pet.id))
}

#[web::get("/mascotas/{pet_id}")]
async fn get_pet_view(
    middleware::logged_user::ClientAccess(session): middleware::logged_user::ClientAccess,
    path: web::types::Path<(i64,)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let pet = api::pet::get_owned_pet(&app_state.repo, session.user.id, path.0)
        .await
        .map_err(|e| errors::from_api_error(e, "at /usuario/mascotas/{id}"))?;

    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "appointments": api::appointment::list_appointments_for_pet(&app_state.repo, pet.id)
            .await
            .map_err(|e| errors::from_api_error(e, "at /usuario/mascotas/{id} appointments"))?,
        "prescriptions": api::prescription::list_prescriptions_for_pet(&app_state.repo, pet.id)
            .await
            .map_err(|e| errors::from_api_error(e, "at /usuario/mascotas/{id} prescriptions"))?,
        "pet": pet,
    }))
    .unwrap_or_default();

    utils::render("client/pet.html", &context)
}

async fn render_schedule_form(
    app_state: &AppState,
    user: &models::user_app::User,
    pet: &models::pet::Pet,
    scheduled_at: &str,
    error: Option<&str>,
) -> Result<web::HttpResponse, web::Error> {
    let veterinarians = api::veterinarian::list_veterinarians(&app_state.repo)
        .await
        .map_err(|e| errors::from_api_error(e, "at schedule form listing veterinarians"))?;

    let status = if error.is_some() {
        ntex::http::StatusCode::BAD_REQUEST
    } else {
        ntex::http::StatusCode::OK
    };

    utils::render_with_status(
        status,
        "client/schedule_form.html",
        &tera::Context::from_value(json!({
            "user": user,
            "pet": pet,
            "veterinarians": veterinarians,
            "scheduled_at": scheduled_at,
            "error": error,
        }))
        .unwrap_or_default(),
    )
}

#[web::get("/citas/agendar/{pet_id}")]
async fn get_schedule_form(
    middleware::logged_user::ClientAccess(session): middleware::logged_user::ClientAccess,
    path: web::types::Path<(i64,)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let pet = api::pet::get_owned_pet(&app_state.repo, session.user.id, path.0)
        .await
        .map_err(|e| errors::from_api_error(e, "at /usuario/citas/agendar"))?;

    render_schedule_form(&app_state, &session.user, &pet, "", None).await
}

/// A taken slot or a past date re-renders the form with the message.
#[web::post("/citas/agendar/{pet_id}")]
async fn schedule_appointment(
    middleware::logged_user::ClientAccess(session): middleware::logged_user::ClientAccess,
    _: middleware::csrf_token::CsrfToken,
    path: web::types::Path<(i64,)>,
    form: web::types::Form<forms::appointment::ScheduleAppointmentForm>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let pet = api::pet::get_owned_pet(&app_state.repo, session.user.id, path.0)
        .await
        .map_err(|e| errors::from_api_error(e, "at /usuario/citas/agendar"))?;

    let scheduled_at = match form.scheduled_at() {
        Ok(scheduled_at) => scheduled_at,
        Err(_) => {
            return render_schedule_form(
                &app_state,
                &session.user,
                &pet,
                &form.scheduled_at,
                Some("fecha y hora invalidas"),
            )
            .await;
        }
    };

    let request = api::appointment::ScheduleAppointmentRequest {
        client_id: session.user.id,
        pet_id: pet.id,
        veterinarian_id: form.veterinarian_id,
        scheduled_at,
    };

    match api::appointment::schedule_appointment(&app_state.repo, request).await {
        Ok(_) => utils::redirect_to(&format!("/usuario/mascotas/{}", pet.id)),
        Err(e) => match errors::form_error_message(&e) {
            Some(msg) => {
                render_schedule_form(
                    &app_state,
                    &session.user,
                    &pet,
                    &scheduled_at
                        .format(consts::DATETIME_LOCAL_INPUT_FORMAT)
                        .to_string(),
                    Some(&msg),
                )
                .await
            }
            None => Err(errors::from_api_error(e, "at /usuario/citas/agendar")),
        },
    }
}

/// Prescription of one of the client's pets
async fn get_owned_prescription(
    app_state: &AppState,
    user_id: i64,
    prescription_id: i64,
) -> Result<models::prescription::Prescription, web::Error> {
    let prescription = api::prescription::get_prescription(&app_state.repo, prescription_id)
        .await
        .map_err(|e| errors::from_api_error(e, "at /usuario/prescripciones"))?;

    api::pet::get_owned_pet(&app_state.repo, user_id, prescription.pet_id)
        .await
        .map_err(|e| errors::from_api_error(e, "at /usuario/prescripciones"))?;

    Ok(prescription)
}

#[web::get("/prescripciones/{prescription_id}")]
async fn get_prescription_view(
    middleware::logged_user::ClientAccess(session): middleware::logged_user::ClientAccess,
    path: web::types::Path<(i64,)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let prescription = get_owned_prescription(&app_state, session.user.id, path.0).await?;
    let product = api::product::get_product(&app_state.repo, prescription.product_id)
        .await
        .map_err(|e| errors::from_api_error(e, "at /usuario/prescripciones/{id}"))?;

    let total = product.total_for(prescription.quantity).ok_or_else(|| {
        errors::ServerError::InternalServerError(format!(
            "total overflow for prescription {}",
            prescription.id
        ))
    })?;

    let context = tera::Context::from_value(json!({
        "user": &session.user,
        "prescription": prescription,
        "product": product,
        "total": total,
    }))
    .unwrap_or_default();

    utils::render("client/prescription.html", &context)
}

#[web::post("/prescripciones/{prescription_id}/pagar")]
async fn pay_prescription(
    middleware::logged_user::ClientAccess(session): middleware::logged_user::ClientAccess,
    _: middleware::csrf_token::CsrfToken,
    path: web::types::Path<(i64,)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let prescription = get_owned_prescription(&app_state, session.user.id, path.0).await?;

    api::prescription::mark_prescription_paid(&app_state.repo, prescription.id)
        .await
        .map_err(|e| errors::from_api_error(e, "at /usuario/prescripciones/{id}/pagar"))?;

    utils::redirect_to(&format!("/usuario/prescripciones/{}", prescription.id))
}
