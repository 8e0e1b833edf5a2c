//! Wtyczka daemon library
//!
//! This module provides the core components of the Wtyczka 2025 API:
//! - Time-gated access checks and the gate middleware
//! - REST handlers for registrations, payments and contacts
//! - Storage backends
//! - Server lifecycle management

pub mod access;
pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;

pub use access::{AccessChecker, AccessError};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError, StorageError};
pub use server::Server;
pub use storage::{InMemoryStorage, PostgresStorage, Storage};
