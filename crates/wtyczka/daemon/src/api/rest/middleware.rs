//! Request-intercepting gate
//!
//! Data endpoints are gated here independently of the check-access endpoints
//! the client polls, so a stale or skipped client-side check cannot reach the
//! data. Each request re-evaluates its gate; no result is cached.

use super::cookies::has_admin_flag;
use super::state::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use wtyczka_types::{denial_message, GateKey};

/// A protected path prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateRule {
    pub prefix: &'static str,
    pub key: GateKey,

    /// Whether the admin flag lets requests through a closed gate
    pub admin_bypass: bool,
}

/// Protected prefixes, first match wins
pub const GATE_RULES: [GateRule; 3] = [
    GateRule {
        prefix: "/api/team-members",
        key: GateKey::ContactDate,
        admin_bypass: false,
    },
    GateRule {
        prefix: "/api/payments",
        key: GateKey::PaymentOpenDate,
        admin_bypass: true,
    },
    GateRule {
        prefix: "/api/data/",
        key: GateKey::PaymentOpenDate,
        admin_bypass: true,
    },
];

/// Rule guarding `path`, if any
pub fn rule_for(path: &str) -> Option<&'static GateRule> {
    GATE_RULES.iter().find(|rule| path.starts_with(rule.prefix))
}

/// Bare error body returned by the gate
#[derive(Debug, Serialize)]
pub struct GateErrorBody {
    pub error: String,
}

fn reject(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(GateErrorBody {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Enforce [`GATE_RULES`]
pub async fn enforce_gates(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let Some(rule) = rule_for(&path) else {
        return next.run(request).await;
    };

    let status = match state.access.check(rule.key).await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(gate = %rule.key, path = %path, error = %e, "Gate check failed");
            return reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to verify access, try again later",
            );
        }
    };

    if status.is_open {
        return next.run(request).await;
    }

    if rule.admin_bypass && has_admin_flag(request.headers(), &state.admin.cookie_name) {
        tracing::info!(gate = %rule.key, path = %path, "Admin flag bypassed closed gate");
        return next.run(request).await;
    }

    tracing::debug!(
        gate = %rule.key,
        path = %path,
        days_remaining = ?status.days_remaining,
        "Request blocked by closed gate"
    );
    reject(StatusCode::FORBIDDEN, denial_message(rule.key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_matching() {
        assert_eq!(
            rule_for("/api/team-members").map(|r| r.key),
            Some(GateKey::ContactDate)
        );
        assert_eq!(
            rule_for("/api/payments").map(|r| r.key),
            Some(GateKey::PaymentOpenDate)
        );
        assert_eq!(
            rule_for("/api/data/payment/abc").map(|r| r.key),
            Some(GateKey::PaymentOpenDate)
        );
        assert!(rule_for("/api/check-access/payment").is_none());
        assert!(rule_for("/api/registrations").is_none());
        assert!(rule_for("/api/data").is_none());
    }

    #[test]
    fn test_contacts_have_no_admin_bypass() {
        let rule = rule_for("/api/team-members/1").unwrap();
        assert!(!rule.admin_bypass);
    }
}
