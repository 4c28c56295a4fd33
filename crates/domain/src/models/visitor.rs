//! Visitor domain models.

use serde::{Deserialize, Serialize};
use shared::validation::normalize_email;

use super::identity::UserIdentity;

/// A gallery attendee, keyed by email and distinct from the login account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Values used when a visitor is created on first registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisitor {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl NewVisitor {
    pub fn from_identity(identity: &UserIdentity) -> Self {
        Self {
            name: identity.display_name(),
            email: normalize_email(&identity.email),
            phone: identity
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        }
    }
}
