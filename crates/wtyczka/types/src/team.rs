//! Organizer contacts

use serde::{Deserialize, Serialize};

/// An organizer whose contact details are revealed after `CONTACT_DATE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
}
