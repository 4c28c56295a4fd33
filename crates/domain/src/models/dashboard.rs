//! Dashboard counters, scoped by caller role.

use serde::{Deserialize, Serialize};

/// Counters visible to every authenticated user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryTotals {
    pub total_artists: i64,
    pub total_exhibitions: i64,
    pub total_visitors: i64,
    pub total_artpieces: i64,
    pub ongoing_exhibitions: i64,
    pub upcoming_exhibitions: i64,
}

/// Registration counters for clerks and admins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationTotals {
    pub total_registrations: i64,
    pub pending_registrations: i64,
    pub confirmed_registrations: i64,
    pub rejected_registrations: i64,
}

/// Art piece availability counters for admins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTotals {
    pub artpieces_available: i64,
    pub artpieces_displayed: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub gallery: GalleryTotals,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub registrations: Option<RegistrationTotals>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogTotals>,
}
