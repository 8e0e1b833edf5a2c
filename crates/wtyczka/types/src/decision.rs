//! Access decisions returned by the check-access endpoints
//!
//! A closed gate is a normal decision (`ok: true, access: false`). Only an
//! infrastructure failure produces `ok: false`, and clients must treat that
//! as "unknown", never as "wait longer".

use crate::gate::{GateKey, GateStatus};
use serde::{Deserialize, Serialize};

/// Wire payload of an access check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub ok: bool,
    pub access: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,

    /// Only reported by the payment-data check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,

    pub message: String,
}

impl AccessDecision {
    fn from_status(status: &GateStatus, access: bool, message: String) -> Self {
        Self {
            ok: true,
            access,
            date: status.date.clone(),
            is_open: Some(status.is_open),
            days_remaining: status.days_remaining,
            is_admin: None,
            message,
        }
    }

    /// Contacts listing check
    pub fn contacts(status: &GateStatus) -> Self {
        let message = match (status.is_open, status.days_remaining) {
            (true, _) => "Contacts are available".to_string(),
            (false, Some(days)) => format!("Contacts will be available in {}", days_phrase(days)),
            (false, None) => "Contacts are not available yet".to_string(),
        };
        Self::from_status(status, status.is_open, message)
    }

    /// Payment form check
    pub fn payment_form(status: &GateStatus) -> Self {
        Self::from_status(status, status.is_open, payment_message(status))
    }

    /// Payment data check. The admin flag forces `access` but `is_open`
    /// still reports the date gate.
    pub fn payment(status: &GateStatus, is_admin: bool) -> Self {
        let message = if is_admin && !status.is_open {
            "Admin access granted, the payment form is not open to participants yet".to_string()
        } else {
            payment_message(status)
        };

        Self {
            is_admin: Some(is_admin),
            ..Self::from_status(status, status.is_open || is_admin, message)
        }
    }

    /// The gate state could not be determined
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            access: false,
            date: None,
            is_open: None,
            days_remaining: None,
            is_admin: None,
            message: message.into(),
        }
    }
}

/// Body text for a request blocked by a closed gate
pub fn denial_message(key: GateKey) -> &'static str {
    match key {
        GateKey::ContactDate => "Contacts are not available yet",
        GateKey::PaymentOpenDate => "Payments are not open yet",
    }
}

fn payment_message(status: &GateStatus) -> String {
    match (status.is_open, status.days_remaining) {
        (true, _) => "The payment form is open".to_string(),
        (false, Some(days)) => format!("The payment form opens in {}", days_phrase(days)),
        (false, None) => "The payment form is not open yet".to_string(),
    }
}

fn days_phrase(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}
