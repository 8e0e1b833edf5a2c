//! Payment handlers
//!
//! All routes here sit behind the payment gate middleware.

use super::registrations::parse_registration_id;
use crate::api::rest::cookies::has_admin_flag;
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use wtyczka_types::{
    check_payment_form, NewPayment, Payment, PaymentId, PaymentUpdate, ProofMetadata,
    RegistrationId, UploadPolicy, ValidationErrors,
};

/// Create payment response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePaymentResponse {
    pub ok: bool,
    pub id: PaymentId,
}

/// Uploaded proof file
#[derive(Debug)]
struct ProofUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Raw multipart fields of the payment form
#[derive(Debug, Default)]
struct PaymentForm {
    registration_id: Option<String>,
    payer_name: Option<String>,
    amount_minor: Option<String>,
    proof: Option<ProofUpload>,
}

impl PaymentForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "registration_id" | "registrationId" => {
                    form.registration_id = Some(read_text(field).await?)
                }
                "payer_name" | "payerName" => form.payer_name = Some(read_text(field).await?),
                "amount_minor" | "amountMinor" => {
                    form.amount_minor = Some(read_text(field).await?)
                }
                "proof" => {
                    let file_name = field.file_name().unwrap_or("proof").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?;
                    form.proof = Some(ProofUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                other => tracing::debug!(field = other, "Ignoring unknown payment form field"),
            }
        }

        Ok(form)
    }

    /// Parse and validate, collecting every rejected field
    fn into_payment_parts(
        self,
        policy: &UploadPolicy,
    ) -> Result<(NewPayment, ProofMetadata, Vec<u8>), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let registration_id = match self.registration_id.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("registrationId", "is required");
                None
            }
            Some(raw) => match raw.parse::<RegistrationId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push("registrationId", "must be a valid registration id");
                    None
                }
            },
        };

        let amount_minor = match self.amount_minor.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("amountMinor", "is required");
                None
            }
            Some(raw) => match raw.parse::<i64>() {
                Ok(amount) => Some(amount),
                Err(_) => {
                    errors.push("amountMinor", "must be a whole number of grosze");
                    None
                }
            },
        };

        let payer_name = self.payer_name.unwrap_or_default();
        let proof = self.proof.map(|upload| {
            let metadata =
                ProofMetadata::from_bytes(upload.file_name, upload.content_type, &upload.bytes);
            (metadata, upload.bytes)
        });

        check_payment_form(
            &mut errors,
            &payer_name,
            amount_minor,
            proof.as_ref().map(|(metadata, _)| metadata),
            policy,
        );

        match (registration_id, amount_minor, proof) {
            (Some(registration_id), Some(amount_minor), Some((metadata, bytes)))
                if errors.is_empty() =>
            {
                let payment = NewPayment {
                    registration_id,
                    payer_name,
                    amount_minor,
                };
                Ok((payment, metadata, bytes))
            }
            _ => Err(errors),
        }
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    Ok(field.text().await?)
}

/// Submit the payment form with its proof of payment
pub async fn create_payment(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<CreatePaymentResponse>)> {
    let form = PaymentForm::read(multipart?).await?;
    let (new_payment, proof, bytes) = form.into_payment_parts(&state.uploads)?;
    let registration_id = new_payment.registration_id;

    if state
        .storage
        .get_registration(&registration_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "Registration {} not found",
            registration_id
        )));
    }

    if state
        .storage
        .get_payment_for_registration(&registration_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Registration {} already has a payment",
            registration_id
        )));
    }

    let payment = new_payment.into_payment(proof, state.clock.now());
    let id = payment.id;

    state.storage.insert_payment(payment, bytes).await?;

    tracing::info!(
        registration_id = %registration_id,
        payment_id = %id,
        "Created payment"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatePaymentResponse { ok: true, id }),
    ))
}

/// Correct payer data of an unconfirmed payment
pub async fn update_payment(
    State(state): State<AppState>,
    Path(registration_id): Path<String>,
    update: Result<Json<PaymentUpdate>, JsonRejection>,
) -> ApiResult<Json<Payment>> {
    let registration_id = parse_registration_id(&registration_id)?;
    let Json(update) = update?;
    update.validate()?;

    let payment = state
        .storage
        .update_payment(&registration_id, update, state.clock.now())
        .await?;

    tracing::info!(registration_id = %registration_id, "Updated payment");

    Ok(Json(payment))
}

/// Download a proof of payment. Organizers only.
pub async fn get_payment_proof(
    State(state): State<AppState>,
    Path(registration_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    if !has_admin_flag(&headers, &state.admin.cookie_name) {
        return Err(ApiError::Unauthorized("admin access required".to_string()));
    }

    let registration_id = parse_registration_id(&registration_id)?;
    let not_found = || ApiError::NotFound(format!("Payment for {} not found", registration_id));

    let payment = state
        .storage
        .get_payment_for_registration(&registration_id)
        .await?
        .ok_or_else(not_found)?;
    let bytes = state
        .storage
        .get_payment_proof(&registration_id)
        .await?
        .ok_or_else(not_found)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        payment.proof.file_name.replace(['"', '\\'], "_")
    );

    Ok((
        [
            (CONTENT_TYPE, payment.proof.content_type),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> ProofUpload {
        ProofUpload {
            file_name: "proof.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"%PDF".to_vec(),
        }
    }

    #[test]
    fn test_form_parts() {
        let id = RegistrationId::generate();
        let form = PaymentForm {
            registration_id: Some(id.to_string()),
            payer_name: Some("Jan Kowalski".to_string()),
            amount_minor: Some(" 89900 ".to_string()),
            proof: Some(upload()),
        };

        let (payment, proof, bytes) = form.into_payment_parts(&UploadPolicy::default()).unwrap();
        assert_eq!(payment.registration_id, id);
        assert_eq!(payment.amount_minor, 89_900);
        assert_eq!(proof.size_bytes, 4);
        assert_eq!(bytes, b"%PDF".to_vec());
    }

    #[test]
    fn test_unparseable_fields_reported_together() {
        let form = PaymentForm {
            registration_id: Some("abc".to_string()),
            amount_minor: Some("12.50".to_string()),
            ..PaymentForm::default()
        };

        let errors = form.into_payment_parts(&UploadPolicy::default()).unwrap_err();
        assert!(errors.has("registrationId"));
        assert!(errors.has("amountMinor"));
        assert!(errors.has("payerName"));
        assert!(errors.has("proof"));
    }

    #[test]
    fn test_missing_proof() {
        let form = PaymentForm {
            registration_id: Some(RegistrationId::generate().to_string()),
            payer_name: Some("Jan".to_string()),
            amount_minor: Some("100".to_string()),
            proof: None,
        };

        let errors = form.into_payment_parts(&UploadPolicy::default()).unwrap_err();
        assert!(errors.has("proof"));
    }
}
