//! Application state for API handlers

use crate::access::AccessChecker;
use crate::clock::Clock;
use crate::config::{AdminConfig, DaemonConfig};
use crate::storage::Storage;
use std::sync::Arc;
use wtyczka_types::UploadPolicy;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub storage: Arc<dyn Storage>,

    /// Time source
    pub clock: Arc<dyn Clock>,

    /// Gate evaluation
    pub access: AccessChecker,

    /// Admin gate settings
    pub admin: Arc<AdminConfig>,

    /// Proof upload limits
    pub uploads: Arc<UploadPolicy>,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, config: &DaemonConfig) -> Self {
        Self {
            access: AccessChecker::new(storage.clone(), clock.clone()),
            storage,
            clock,
            admin: Arc::new(config.admin.clone()),
            uploads: Arc::new(config.uploads.policy()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let duration = chrono::Utc::now() - self.started_at;
        let secs = duration.num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
