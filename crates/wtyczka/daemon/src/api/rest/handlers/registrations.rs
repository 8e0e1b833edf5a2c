//! Registration handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wtyczka_types::{NewRegistration, RegistrationId, RegistrationStatus};

/// Create registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRegistrationResponse {
    pub ok: bool,
    pub id: RegistrationId,
    pub status: RegistrationStatus,
}

/// Registration status response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatusResponse {
    pub id: RegistrationId,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_submitted_at: Option<DateTime<Utc>>,
}

pub(crate) fn parse_registration_id(raw: &str) -> ApiResult<RegistrationId> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid registration id {:?}", raw)))
}

/// Register a participant
pub async fn create_registration(
    State(state): State<AppState>,
    form: Result<Json<NewRegistration>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateRegistrationResponse>)> {
    let Json(form) = form?;
    form.validate()?;

    let registration = form.into_registration(state.clock.now());
    let id = registration.id;

    if state
        .storage
        .find_registration_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "email {} is already registered",
            registration.email
        )));
    }

    // The backend still enforces uniqueness against concurrent inserts
    state.storage.insert_registration(registration).await?;

    tracing::info!(registration_id = %id, "Created registration");

    Ok((
        StatusCode::CREATED,
        Json(CreateRegistrationResponse {
            ok: true,
            id,
            status: RegistrationStatus::Registered,
        }),
    ))
}

/// Track a registration
pub async fn registration_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RegistrationStatusResponse>> {
    let registration_id = parse_registration_id(&id)?;

    let registration = state
        .storage
        .get_registration(&registration_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Registration {} not found", id)))?;

    let payment = state
        .storage
        .get_payment_for_registration(&registration_id)
        .await?;

    Ok(Json(RegistrationStatusResponse {
        id: registration.id,
        status: RegistrationStatus::from_payment(payment.as_ref()),
        registered_at: registration.created_at,
        payment_submitted_at: payment.map(|p| p.created_at),
    }))
}
