//! In-memory storage implementation

use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use wtyczka_types::{
    normalize_email, Payment, PaymentUpdate, Registration, RegistrationId, TeamMember,
};

/// In-memory storage for development and testing
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    settings: Arc<RwLock<HashMap<String, String>>>,
    registrations: Arc<RwLock<HashMap<RegistrationId, Registration>>>,
    payments: Arc<RwLock<HashMap<RegistrationId, (Payment, Vec<u8>)>>>,
    team: Arc<RwLock<Vec<TeamMember>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a config entry. Stands in for the out-of-band DB console.
    pub async fn set_setting(&self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.write().await.insert(key.into(), value.into());
    }

    pub async fn remove_setting(&self, key: &str) {
        self.settings.write().await.remove(key);
    }

    /// Seed the organizer contact list
    pub async fn set_team_members(&self, members: Vec<TeamMember>) {
        *self.team.write().await = members;
    }

    /// Mark a payment as booked, as organizers do out-of-band
    pub async fn confirm_payment(&self, registration_id: &RegistrationId) -> StorageResult<()> {
        let mut payments = self.payments.write().await;
        let (payment, _) = payments
            .get_mut(registration_id)
            .ok_or_else(|| StorageError::NotFound(format!("payment for {}", registration_id)))?;
        payment.confirmed = true;
        Ok(())
    }
}

#[async_trait]
impl SettingsStorage for InMemoryStorage {
    async fn get_setting(&self, key: &str) -> StorageResult<Option<String>> {
        let settings = self.settings.read().await;
        Ok(settings.get(key).cloned())
    }
}

#[async_trait]
impl RegistrationStorage for InMemoryStorage {
    async fn insert_registration(&self, registration: Registration) -> StorageResult<()> {
        let mut registrations = self.registrations.write().await;

        let email = normalize_email(&registration.email);
        if registrations.values().any(|r| r.email == email) {
            return Err(StorageError::Conflict(format!(
                "email {} is already registered",
                email
            )));
        }

        registrations.insert(registration.id, registration);
        Ok(())
    }

    async fn get_registration(&self, id: &RegistrationId) -> StorageResult<Option<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations.get(id).cloned())
    }

    async fn find_registration_by_email(&self, email: &str) -> StorageResult<Option<Registration>> {
        let email = normalize_email(email);
        let registrations = self.registrations.read().await;
        Ok(registrations.values().find(|r| r.email == email).cloned())
    }
}

#[async_trait]
impl PaymentStorage for InMemoryStorage {
    async fn insert_payment(&self, payment: Payment, proof: Vec<u8>) -> StorageResult<()> {
        let mut payments = self.payments.write().await;

        if payments.contains_key(&payment.registration_id) {
            return Err(StorageError::Conflict(format!(
                "registration {} already has a payment",
                payment.registration_id
            )));
        }

        payments.insert(payment.registration_id, (payment, proof));
        Ok(())
    }

    async fn get_payment_for_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> StorageResult<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(registration_id).map(|(p, _)| p.clone()))
    }

    async fn update_payment(
        &self,
        registration_id: &RegistrationId,
        update: PaymentUpdate,
        now: DateTime<Utc>,
    ) -> StorageResult<Payment> {
        let mut payments = self.payments.write().await;
        let (payment, _) = payments
            .get_mut(registration_id)
            .ok_or_else(|| StorageError::NotFound(format!("payment for {}", registration_id)))?;

        if payment.confirmed {
            return Err(StorageError::Conflict(format!(
                "payment for {} is already confirmed",
                registration_id
            )));
        }

        payment.apply(update, now);
        Ok(payment.clone())
    }

    async fn get_payment_proof(&self, registration_id: &RegistrationId) -> StorageResult<Option<Vec<u8>>> {
        let payments = self.payments.read().await;
        Ok(payments.get(registration_id).map(|(_, bytes)| bytes.clone()))
    }
}

#[async_trait]
impl TeamStorage for InMemoryStorage {
    async fn list_team_members(&self) -> StorageResult<Vec<TeamMember>> {
        Ok(self.team.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtyczka_types::{Diet, NewPayment, NewRegistration, ProofMetadata, ShirtSize};

    fn registration(email: &str) -> Registration {
        NewRegistration {
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            email: email.to_string(),
            phone: "600100200".to_string(),
            faculty: "EAIiIB".to_string(),
            shirt_size: ShirtSize::L,
            diet: Diet::Standard,
            notes: None,
            rules_accepted: true,
        }
        .into_registration(Utc::now())
    }

    fn payment(registration_id: RegistrationId) -> Payment {
        NewPayment {
            registration_id,
            payer_name: "Jan Kowalski".to_string(),
            amount_minor: 50_000,
        }
        .into_payment(
            ProofMetadata::from_bytes("p.pdf", "application/pdf", b"pdf"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get_setting("CONTACT_DATE").await.unwrap(), None);

        storage.set_setting("CONTACT_DATE", "2025-10-01").await;
        assert_eq!(
            storage.get_setting("CONTACT_DATE").await.unwrap().as_deref(),
            Some("2025-10-01")
        );

        storage.remove_setting("CONTACT_DATE").await;
        assert_eq!(storage.get_setting("CONTACT_DATE").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let storage = InMemoryStorage::new();
        storage
            .insert_registration(registration("jan@example.com"))
            .await
            .unwrap();

        let err = storage
            .insert_registration(registration("JAN@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let found = storage
            .find_registration_by_email(" Jan@Example.com")
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_one_payment_per_registration() {
        let storage = InMemoryStorage::new();
        let id = RegistrationId::generate();

        storage.insert_payment(payment(id), b"pdf".to_vec()).await.unwrap();
        let err = storage
            .insert_payment(payment(id), b"pdf".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        assert_eq!(
            storage.get_payment_proof(&id).await.unwrap(),
            Some(b"pdf".to_vec())
        );
    }

    #[tokio::test]
    async fn test_confirmed_payment_is_frozen() {
        let storage = InMemoryStorage::new();
        let id = RegistrationId::generate();
        storage.insert_payment(payment(id), Vec::new()).await.unwrap();

        let update = PaymentUpdate {
            amount_minor: Some(60_000),
            ..Default::default()
        };
        let updated = storage
            .update_payment(&id, update.clone(), Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.amount_minor, 60_000);

        storage.confirm_payment(&id).await.unwrap();
        let err = storage
            .update_payment(&id, update, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_missing_payment() {
        let storage = InMemoryStorage::new();
        let err = storage
            .update_payment(
                &RegistrationId::generate(),
                PaymentUpdate::default(),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
