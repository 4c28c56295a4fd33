//! Role-based authorization for gallery operations.

use serde::Serialize;

use super::identity::UserRole;

/// Role-gated operations. Submitting, following one's own queue and
/// cancelling one's own registration are open to every authenticated role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CancelAnyRegistration,
    ReviewRegistration,
    ListRegistrations,
    ViewAnyRegistration,
    ViewRegistrationStats,
    ViewCatalogStats,
}

/// Returns whether `role` may perform `action`.
pub fn authorize(role: UserRole, action: Action) -> bool {
    match action {
        Action::CancelAnyRegistration
        | Action::ReviewRegistration
        | Action::ListRegistrations
        | Action::ViewAnyRegistration
        | Action::ViewRegistrationStats => role.is_reviewer(),
        Action::ViewCatalogStats => role == UserRole::Admin,
    }
}
