//! Time-gated access checks
//!
//! Every check re-reads the threshold from storage; nothing is cached, so a
//! date changed in the database takes effect on the next request.

use crate::clock::Clock;
use crate::error::{ApiError, StorageError};
use crate::storage::Storage;
use std::sync::Arc;
use thiserror::Error;
use wtyczka_types::{evaluate, GateError, GateKey, GateStatus};

/// Why a gate state could not be determined.
///
/// Never a denial: callers report these as "unknown".
#[derive(Debug, Error)]
pub enum AccessError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl From<AccessError> for ApiError {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::Storage(e) => ApiError::Storage(e),
            AccessError::Gate(e) => ApiError::Gate(e),
        }
    }
}

/// Evaluates gates against storage and the injected clock
#[derive(Clone)]
pub struct AccessChecker {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl AccessChecker {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Current state of `key`
    pub async fn check(&self, key: GateKey) -> Result<GateStatus, AccessError> {
        let stored = self.storage.get_setting(key.as_str()).await?;
        let now = self.clock.now();

        let status = evaluate(key, stored.as_deref(), now)?;

        tracing::debug!(
            gate = %key,
            is_open = status.is_open,
            days_remaining = ?status.days_remaining,
            configured = status.is_configured(),
            "Evaluated gate"
        );

        Ok(status)
    }
}
