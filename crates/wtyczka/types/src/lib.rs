//! Wtyczka Types - Core types for the Wtyczka 2025 registration service
//!
//! Wtyczka 2025 is a one-time student trip. Participants register, pay once
//! the payment form opens, and get the organizers' contacts once the contact
//! date passes. This crate holds everything that does not touch I/O.
//!
//! ## Key Concepts
//!
//! - **GateKey**: Named config entry holding a gate threshold
//! - **GateStatus**: Result of comparing `now` against a stored threshold
//! - **AccessDecision**: Wire payload returned by the access-check endpoints
//! - **Registration / Payment**: Passthrough records with schema validation
//! - **TeamMember**: Organizer contact revealed after the contact date

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod decision;
pub mod gate;
pub mod ids;
pub mod payment;
pub mod registration;
pub mod team;
pub mod validation;

// Re-export main types
pub use decision::{denial_message, AccessDecision};
pub use gate::{days_remaining, evaluate, parse_threshold, GateError, GateKey, GateStatus};
pub use ids::{PaymentId, RegistrationId};
pub use payment::{
    check_payment_form, NewPayment, Payment, PaymentUpdate, ProofMetadata, UploadPolicy,
};
pub use registration::{
    normalize_email, Diet, NewRegistration, Registration, RegistrationStatus, ShirtSize,
};
pub use team::TeamMember;
pub use validation::{FieldError, ValidationErrors};
