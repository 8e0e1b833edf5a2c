//! Check-access handlers
//!
//! Clients poll these to render a countdown instead of a raw 403. A closed
//! gate is a 200 with `access: false`; a 500 with `ok: false` means the state
//! is unknown.

use crate::access::AccessError;
use crate::api::rest::cookies::has_admin_flag;
use crate::api::rest::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use wtyczka_types::{AccessDecision, GateKey, GateStatus};

async fn decide(
    state: &AppState,
    key: GateKey,
    build: impl FnOnce(&GateStatus) -> AccessDecision,
) -> Response {
    match state.access.check(key).await {
        Ok(status) => Json(build(&status)).into_response(),
        Err(e) => failure(key, e),
    }
}

fn failure(key: GateKey, error: AccessError) -> Response {
    tracing::error!(gate = %key, error = %error, "Access check failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(AccessDecision::failure(
            "Unable to verify access, try again later",
        )),
    )
        .into_response()
}

/// Contacts listing gate, open when unconfigured
pub async fn check_contacts_access(State(state): State<AppState>) -> Response {
    decide(&state, GateKey::ContactDate, AccessDecision::contacts).await
}

/// Payment form gate, closed when unconfigured
pub async fn check_payment_form_access(State(state): State<AppState>) -> Response {
    decide(&state, GateKey::PaymentOpenDate, AccessDecision::payment_form).await
}

/// Payment data gate with admin bypass
pub async fn check_payment_access(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let is_admin = has_admin_flag(&headers, &state.admin.cookie_name);
    decide(&state, GateKey::PaymentOpenDate, |status| {
        AccessDecision::payment(status, is_admin)
    })
    .await
}
