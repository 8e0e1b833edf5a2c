//! Storage trait definitions

use crate::error::StorageError;
use async_trait::async_trait;
use wtyczka_types::{Payment, PaymentUpdate, Registration, RegistrationId, TeamMember};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Combined storage trait
#[async_trait]
pub trait Storage:
    SettingsStorage + RegistrationStorage + PaymentStorage + TeamStorage + Send + Sync
{
}

impl<T> Storage for T where
    T: SettingsStorage + RegistrationStorage + PaymentStorage + TeamStorage + Send + Sync
{
}

/// Key-value config entries. Read-only from the application.
#[async_trait]
pub trait SettingsStorage: Send + Sync {
    /// Raw value stored under `key`
    async fn get_setting(&self, key: &str) -> StorageResult<Option<String>>;
}

/// Storage for registrations
#[async_trait]
pub trait RegistrationStorage: Send + Sync {
    /// Insert a registration. Fails with `Conflict` if the email is taken.
    async fn insert_registration(&self, registration: Registration) -> StorageResult<()>;

    /// Get a registration by ID
    async fn get_registration(&self, id: &RegistrationId) -> StorageResult<Option<Registration>>;

    /// Get a registration by normalized email
    async fn find_registration_by_email(&self, email: &str) -> StorageResult<Option<Registration>>;
}

/// Storage for payments and their proof files
#[async_trait]
pub trait PaymentStorage: Send + Sync {
    /// Insert a payment with its proof bytes. Fails with `Conflict` if the
    /// registration already has one.
    async fn insert_payment(&self, payment: Payment, proof: Vec<u8>) -> StorageResult<()>;

    /// Payment attached to a registration
    async fn get_payment_for_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> StorageResult<Option<Payment>>;

    /// Apply a correction to the payment of a registration.
    ///
    /// `NotFound` if there is no payment, `Conflict` once it is confirmed.
    async fn update_payment(
        &self,
        registration_id: &RegistrationId,
        update: PaymentUpdate,
        now: chrono::DateTime<chrono::Utc>,
    ) -> StorageResult<Payment>;

    /// Proof bytes of a payment
    async fn get_payment_proof(&self, registration_id: &RegistrationId) -> StorageResult<Option<Vec<u8>>>;
}

/// Organizer contacts. Read-only from the application.
#[async_trait]
pub trait TeamStorage: Send + Sync {
    async fn list_team_members(&self) -> StorageResult<Vec<TeamMember>>;
}
