//! API request handlers

mod admin;
mod gates;
mod health;
mod payments;
mod registrations;
mod team;

pub use admin::*;
pub use gates::*;
pub use health::*;
pub use payments::*;
pub use registrations::*;
pub use team::*;
