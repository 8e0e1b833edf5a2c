//! Storage layer for wtyczka-daemon
//!
//! Provides persistent storage for config entries, registrations, payments
//! and organizer contacts.

mod memory;
mod postgres;
mod traits;

pub use memory::InMemoryStorage;
pub use postgres::PostgresStorage;
pub use traits::{
    PaymentStorage, RegistrationStorage, SettingsStorage, Storage, StorageResult, TeamStorage,
};
