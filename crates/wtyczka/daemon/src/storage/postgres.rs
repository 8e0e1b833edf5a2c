//! PostgreSQL storage implementation

use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;
use wtyczka_types::{normalize_email, Payment, PaymentUpdate, Registration, RegistrationId, TeamMember};

/// Postgres `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed storage
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Connect to PostgreSQL and initialize schema
    pub async fn new(
        url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let storage = Self { pool };
        storage.initialize_schema().await?;
        Ok(storage)
    }

    async fn initialize_schema(&self) -> Result<(), StorageError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS registrations (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS payments (
                id UUID PRIMARY KEY,
                registration_id UUID NOT NULL UNIQUE REFERENCES registrations(id),
                confirmed BOOLEAN NOT NULL DEFAULT FALSE,
                data JSONB NOT NULL,
                proof BYTEA NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS team_members (
                position INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL
            );
            "#,
        ];

        for stmt in statements {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Query(e.to_string()))?;
        }

        Ok(())
    }

    fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, StorageError> {
        serde_json::to_value(value)
            .map_err(|e| StorageError::InvalidData(format!("json serialize error: {}", e)))
    }

    fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, StorageError> {
        serde_json::from_value(value)
            .map_err(|e| StorageError::InvalidData(format!("json deserialize error: {}", e)))
    }

    /// Map a write error, turning unique violations into `Conflict`
    fn write_error(error: sqlx::Error, conflict: impl FnOnce() -> String) -> StorageError {
        match &error {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StorageError::Conflict(conflict())
            }
            _ => StorageError::Query(error.to_string()),
        }
    }

    async fn fetch_payment(
        &self,
        registration_id: &RegistrationId,
    ) -> StorageResult<Option<Payment>> {
        let row = sqlx::query("SELECT data, confirmed FROM payments WHERE registration_id = $1")
            .bind(registration_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        match row {
            Some(record) => {
                let data: Value = record
                    .try_get("data")
                    .map_err(|e| StorageError::Query(e.to_string()))?;
                let confirmed: bool = record
                    .try_get("confirmed")
                    .map_err(|e| StorageError::Query(e.to_string()))?;

                // The column is authoritative; organizers flip it by hand
                let mut payment: Payment = Self::from_json(data)?;
                payment.confirmed = confirmed;
                Ok(Some(payment))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SettingsStorage for PostgresStorage {
    async fn get_setting(&self, key: &str) -> StorageResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        match row {
            Some(record) => record
                .try_get::<Option<String>, _>("value")
                .map_err(|e| StorageError::Query(e.to_string())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RegistrationStorage for PostgresStorage {
    async fn insert_registration(&self, registration: Registration) -> StorageResult<()> {
        let email = normalize_email(&registration.email);

        sqlx::query(
            "INSERT INTO registrations (id, email, data, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(registration.id.as_uuid())
        .bind(&email)
        .bind(Self::to_json(&registration)?)
        .bind(registration.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, || format!("email {} is already registered", email)))?;

        Ok(())
    }

    async fn get_registration(&self, id: &RegistrationId) -> StorageResult<Option<Registration>> {
        let row = sqlx::query("SELECT data FROM registrations WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        match row {
            Some(record) => {
                let data: Value = record
                    .try_get("data")
                    .map_err(|e| StorageError::Query(e.to_string()))?;
                Ok(Some(Self::from_json(data)?))
            }
            None => Ok(None),
        }
    }

    async fn find_registration_by_email(&self, email: &str) -> StorageResult<Option<Registration>> {
        let row = sqlx::query("SELECT data FROM registrations WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        match row {
            Some(record) => {
                let data: Value = record
                    .try_get("data")
                    .map_err(|e| StorageError::Query(e.to_string()))?;
                Ok(Some(Self::from_json(data)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PaymentStorage for PostgresStorage {
    async fn insert_payment(&self, payment: Payment, proof: Vec<u8>) -> StorageResult<()> {
        let registration_id = payment.registration_id;

        sqlx::query(
            r#"
            INSERT INTO payments (id, registration_id, confirmed, data, proof, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(registration_id.as_uuid())
        .bind(payment.confirmed)
        .bind(Self::to_json(&payment)?)
        .bind(proof)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Self::write_error(e, || {
                format!("registration {} already has a payment", registration_id)
            })
        })?;

        Ok(())
    }

    async fn get_payment_for_registration(
        &self,
        registration_id: &RegistrationId,
    ) -> StorageResult<Option<Payment>> {
        self.fetch_payment(registration_id).await
    }

    async fn update_payment(
        &self,
        registration_id: &RegistrationId,
        update: PaymentUpdate,
        now: DateTime<Utc>,
    ) -> StorageResult<Payment> {
        let mut payment = self
            .fetch_payment(registration_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("payment for {}", registration_id)))?;

        if payment.confirmed {
            return Err(StorageError::Conflict(format!(
                "payment for {} is already confirmed",
                registration_id
            )));
        }

        payment.apply(update, now);

        // Guard against a confirmation landing between read and write
        let result = sqlx::query(
            r#"
            UPDATE payments SET data = $2, updated_at = $3
            WHERE registration_id = $1 AND confirmed = FALSE
            "#,
        )
        .bind(registration_id.as_uuid())
        .bind(Self::to_json(&payment)?)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict(format!(
                "payment for {} is already confirmed",
                registration_id
            )));
        }

        Ok(payment)
    }

    async fn get_payment_proof(&self, registration_id: &RegistrationId) -> StorageResult<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT proof FROM payments WHERE registration_id = $1")
            .bind(registration_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        match row {
            Some(record) => record
                .try_get::<Vec<u8>, _>("proof")
                .map(Some)
                .map_err(|e| StorageError::Query(e.to_string())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TeamStorage for PostgresStorage {
    async fn list_team_members(&self) -> StorageResult<Vec<TeamMember>> {
        let rows = sqlx::query("SELECT name, role, email, phone FROM team_members ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                Ok(TeamMember {
                    name: row.try_get("name").map_err(|e| StorageError::Query(e.to_string()))?,
                    role: row.try_get("role").map_err(|e| StorageError::Query(e.to_string()))?,
                    email: row.try_get("email").map_err(|e| StorageError::Query(e.to_string()))?,
                    phone: row.try_get("phone").map_err(|e| StorageError::Query(e.to_string()))?,
                })
            })
            .collect()
    }
}
