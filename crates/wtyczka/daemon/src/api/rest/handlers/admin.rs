//! Admin shared-secret gate

use crate::api::rest::cookies::admin_cookie;
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    body::Bytes,
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Verify admin request
#[derive(Debug, Deserialize)]
pub struct VerifyAdminRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Verify admin response
#[derive(Debug, Serialize)]
pub struct VerifyAdminResponse {
    pub ok: bool,
}

/// Equality over digests so the comparison time does not depend on the input
fn secrets_match(submitted: &str, secret: &str) -> bool {
    blake3::hash(submitted.as_bytes()) == blake3::hash(secret.as_bytes())
}

/// Check the submitted password against the configured secret.
///
/// An unconfigured secret is reported before the body is even read, so
/// operators can tell "nobody can pass" from "wrong password".
pub async fn verify_admin(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let secret = state
        .admin
        .secret()
        .ok_or_else(|| ApiError::Misconfigured("admin password is not configured".to_string()))?;

    let password = serde_json::from_slice::<VerifyAdminRequest>(&body)
        .ok()
        .and_then(|request| request.password)
        .filter(|password| !password.is_empty())
        .ok_or_else(|| ApiError::BadRequest("password is required".to_string()))?;

    if !secrets_match(&password, secret) {
        tracing::warn!("Rejected admin password");
        return Err(ApiError::Unauthorized("invalid password".to_string()));
    }

    tracing::info!("Admin flag issued");

    let cookie = admin_cookie(
        &state.admin.cookie_name,
        state.admin.cookie_max_age_secs,
        state.admin.cookie_secure,
    );
    Ok(([(SET_COOKIE, cookie)], Json(VerifyAdminResponse { ok: true })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("wtyczka2025", "wtyczka2025"));
        assert!(!secrets_match("wtyczka2026", "wtyczka2025"));
        assert!(!secrets_match("", "wtyczka2025"));
    }
}
