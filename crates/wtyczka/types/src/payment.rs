//! Payments and proof-of-payment uploads

use crate::ids::{PaymentId, RegistrationId};
use crate::validation::{require_text, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_PAYER_CHARS: usize = 200;
const MAX_FILE_NAME_CHARS: usize = 255;

/// Metadata of an uploaded proof of payment. The bytes live in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofMetadata {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,

    /// BLAKE3 hex digest of the file
    pub digest: String,
}

impl ProofMetadata {
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes: bytes.len() as u64,
            digest: blake3::hash(bytes).to_hex().to_string(),
        }
    }
}

/// Limits applied to proof uploads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: 5 * 1024 * 1024, // 5MB
            allowed_content_types: vec![
                "application/pdf".to_string(),
                "image/jpeg".to_string(),
                "image/png".to_string(),
            ],
        }
    }
}

impl UploadPolicy {
    fn check(&self, proof: &ProofMetadata, errors: &mut ValidationErrors) {
        if proof.size_bytes == 0 {
            errors.push("proof", "file is empty");
        } else if proof.size_bytes > self.max_size_bytes {
            errors.push(
                "proof",
                format!("file exceeds {} bytes", self.max_size_bytes),
            );
        }

        let content_type = proof
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&content_type))
        {
            errors.push(
                "proof",
                format!("content type {:?} is not accepted", proof.content_type),
            );
        }

        if proof.file_name.chars().count() > MAX_FILE_NAME_CHARS {
            errors.push("proof", "file name is too long");
        }
    }
}

/// Payment form payload, minus the file bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub registration_id: RegistrationId,
    pub payer_name: String,
    pub amount_minor: i64,
}

/// Check the payer, amount and proof of a payment form.
///
/// `amount_minor` is `None` when the raw value did not parse; the caller has
/// already reported it, so only the remaining fields are checked.
pub fn check_payment_form(
    errors: &mut ValidationErrors,
    payer_name: &str,
    amount_minor: Option<i64>,
    proof: Option<&ProofMetadata>,
    policy: &UploadPolicy,
) {
    require_text(errors, "payerName", payer_name, MAX_PAYER_CHARS);
    if matches!(amount_minor, Some(amount) if amount <= 0) {
        errors.push("amountMinor", "must be greater than zero");
    }

    match proof {
        Some(proof) => policy.check(proof, errors),
        None => errors.push("proof", "is required"),
    }
}

impl NewPayment {
    pub fn into_payment(self, proof: ProofMetadata, now: DateTime<Utc>) -> Payment {
        Payment {
            id: PaymentId::generate(),
            registration_id: self.registration_id,
            payer_name: self.payer_name.trim().to_string(),
            amount_minor: self.amount_minor,
            proof,
            confirmed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Stored payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub registration_id: RegistrationId,
    pub payer_name: String,
    pub amount_minor: i64,
    pub proof: ProofMetadata,

    /// Set by organizers once the transfer is booked
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn apply(&mut self, update: PaymentUpdate, now: DateTime<Utc>) {
        if let Some(payer_name) = update.payer_name {
            self.payer_name = payer_name.trim().to_string();
        }
        if let Some(amount_minor) = update.amount_minor {
            self.amount_minor = amount_minor;
        }
        self.updated_at = now;
    }
}

/// Partial payment data correction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    #[serde(default)]
    pub payer_name: Option<String>,
    #[serde(default)]
    pub amount_minor: Option<i64>,
}

impl PaymentUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.payer_name.is_none() && self.amount_minor.is_none() {
            errors.push("body", "nothing to update");
        }
        if let Some(payer_name) = &self.payer_name {
            require_text(&mut errors, "payerName", payer_name, MAX_PAYER_CHARS);
        }
        if matches!(self.amount_minor, Some(amount) if amount <= 0) {
            errors.push("amountMinor", "must be greater than zero");
        }

        errors.into_result()
    }
}
