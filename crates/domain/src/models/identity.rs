//! Authenticated caller identity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Account role as asserted by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Clerk,
    Visitor,
}

impl UserRole {
    /// Clerks and admins review registrations.
    pub fn is_reviewer(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Clerk)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "clerk" => Ok(UserRole::Clerk),
            "visitor" => Ok(UserRole::Visitor),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Clerk => write!(f, "clerk"),
            UserRole::Visitor => write!(f, "visitor"),
        }
    }
}

/// The authenticated-user record the queue engine consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
}

impl UserIdentity {
    /// Name used for a lazily created visitor: "first last", else the
    /// account name, else the email.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        let username = self.username.trim();
        if !username.is_empty() {
            return username.to_string();
        }
        self.email.trim().to_string()
    }

    /// Label stamped on registrations this identity reviews.
    pub fn reviewer_label(&self) -> String {
        if self.username.trim().is_empty() {
            self.email.clone()
        } else {
            self.username.clone()
        }
    }
}
