//! Participant registrations

use crate::ids::RegistrationId;
use crate::payment::Payment;
use crate::validation::{check_email, check_phone, require_text, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_NAME_CHARS: usize = 100;
const MAX_FACULTY_CHARS: usize = 120;
const MAX_NOTES_CHARS: usize = 1000;

/// T-shirt size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShirtSize {
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
}

/// Catering preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diet {
    #[default]
    Standard,
    Vegetarian,
    Vegan,
}

/// Registration form payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub faculty: String,
    pub shirt_size: ShirtSize,
    #[serde(default)]
    pub diet: Diet,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rules_accepted: bool,
}

impl NewRegistration {
    /// Validate the form, collecting every rejected field
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        require_text(&mut errors, "firstName", &self.first_name, MAX_NAME_CHARS);
        require_text(&mut errors, "lastName", &self.last_name, MAX_NAME_CHARS);
        check_email(&mut errors, "email", &self.email);
        check_phone(&mut errors, "phone", &self.phone);
        require_text(&mut errors, "faculty", &self.faculty, MAX_FACULTY_CHARS);

        if let Some(notes) = &self.notes {
            if notes.chars().count() > MAX_NOTES_CHARS {
                errors.push(
                    "notes",
                    format!("must be at most {} characters", MAX_NOTES_CHARS),
                );
            }
        }

        if !self.rules_accepted {
            errors.push("rulesAccepted", "the trip rules must be accepted");
        }

        errors.into_result()
    }

    /// Build the stored record. Text is trimmed and the email lowercased.
    pub fn into_registration(self, now: DateTime<Utc>) -> Registration {
        Registration {
            id: RegistrationId::generate(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: normalize_email(&self.email),
            phone: self.phone.trim().to_string(),
            faculty: self.faculty.trim().to_string(),
            shirt_size: self.shirt_size,
            diet: self.diet,
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            rules_accepted: self.rules_accepted,
            created_at: now,
        }
    }
}

/// Email as stored and compared for uniqueness
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Stored registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: RegistrationId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub faculty: String,
    pub shirt_size: ShirtSize,
    pub diet: Diet,
    pub notes: Option<String>,
    pub rules_accepted: bool,
    pub created_at: DateTime<Utc>,
}

/// Where a participant stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    PaymentSubmitted,
    PaymentConfirmed,
}

impl RegistrationStatus {
    pub fn from_payment(payment: Option<&Payment>) -> Self {
        match payment {
            None => RegistrationStatus::Registered,
            Some(p) if p.confirmed => RegistrationStatus::PaymentConfirmed,
            Some(_) => RegistrationStatus::PaymentSubmitted,
        }
    }
}
