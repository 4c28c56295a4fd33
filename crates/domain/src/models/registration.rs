//! Registration domain models and the registration state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::Pagination;
use std::str::FromStr;
use validator::Validate;

use super::exhibition::ExhibitionStatus;

/// Status of a registration.
///
/// `Pending` is the only initial state; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RegistrationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RegistrationStatus::Pending)
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::Pending => write!(f, "PENDING"),
            RegistrationStatus::Approved => write!(f, "APPROVED"),
            RegistrationStatus::Rejected => write!(f, "REJECTED"),
            RegistrationStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(RegistrationStatus::Pending),
            "APPROVED" => Ok(RegistrationStatus::Approved),
            "REJECTED" => Ok(RegistrationStatus::Rejected),
            "CANCELLED" => Ok(RegistrationStatus::Cancelled),
            _ => Err(format!("Unknown registration status: {}", s)),
        }
    }
}

/// A visitor's registration for an exhibition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    pub visitor_id: i64,
    pub exhibition_id: i64,
    pub attendees_count: i32,
    pub status: RegistrationStatus,
    /// Mirror of `status == APPROVED`, kept for older clients.
    pub confirmed: bool,
    pub queue_position: Option<i32>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub visitor_notified: bool,
}

/// Values for inserting a freshly queued registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub visitor_id: i64,
    pub exhibition_id: i64,
    pub attendees_count: i32,
    pub queue_position: i32,
    pub submitted_at: DateTime<Utc>,
}

impl NewRegistration {
    /// Materializes the row a store persists for this insert.
    pub fn into_registration(self, id: i64) -> Registration {
        Registration {
            id,
            visitor_id: self.visitor_id,
            exhibition_id: self.exhibition_id,
            attendees_count: self.attendees_count,
            status: RegistrationStatus::Pending,
            confirmed: false,
            queue_position: Some(self.queue_position),
            submitted_at: self.submitted_at,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            visitor_notified: true,
        }
    }
}

/// A move out of `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Approve { reviewed_by: String },
    Reject { reviewed_by: String, reason: String },
    Cancel,
}

impl Transition {
    pub fn target(&self) -> RegistrationStatus {
        match self {
            Transition::Approve { .. } => RegistrationStatus::Approved,
            Transition::Reject { .. } => RegistrationStatus::Rejected,
            Transition::Cancel => RegistrationStatus::Cancelled,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Transition::Approve { .. } => "approve",
            Transition::Reject { .. } => "reject",
            Transition::Cancel => "cancel",
        }
    }
}

/// Attempted transition from a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot {action} registration with status: {from}")]
pub struct InvalidTransition {
    pub from: RegistrationStatus,
    pub action: &'static str,
}

impl Registration {
    /// Applies a transition out of `Pending`.
    ///
    /// Returns the queue position the registration vacated; the caller must
    /// close that gap in the same unit of work.
    pub fn apply(
        &mut self,
        transition: Transition,
        at: DateTime<Utc>,
    ) -> Result<Option<i32>, InvalidTransition> {
        if self.status != RegistrationStatus::Pending {
            return Err(InvalidTransition {
                from: self.status,
                action: transition.verb(),
            });
        }

        let vacated = self.queue_position.take();
        self.status = transition.target();
        self.confirmed = self.status == RegistrationStatus::Approved;

        match transition {
            Transition::Approve { reviewed_by } => {
                self.reviewed_by = Some(reviewed_by);
                self.reviewed_at = Some(at);
                self.visitor_notified = false;
            }
            Transition::Reject {
                reviewed_by,
                reason,
            } => {
                self.reviewed_by = Some(reviewed_by);
                self.reviewed_at = Some(at);
                self.rejection_reason = Some(reason);
                self.visitor_notified = false;
            }
            Transition::Cancel => {}
        }

        Ok(vacated)
    }

    /// Whether the row satisfies the status/confirmed/position invariants.
    pub fn is_consistent(&self) -> bool {
        let pending = self.status == RegistrationStatus::Pending;
        self.confirmed == (self.status == RegistrationStatus::Approved)
            && pending == self.queue_position.is_some()
            && self.queue_position.map_or(true, |p| p >= 1)
    }
}

/// Request body for submitting a registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SubmitRegistrationRequest {
    #[validate(custom(function = "shared::validation::validate_positive_id"))]
    pub exhibition_id: i64,

    #[serde(default = "default_attendees")]
    #[validate(custom(function = "shared::validation::validate_attendees_count"))]
    pub attendees_count: i32,
}

/// Request body for registering via `/exhibitions/:id/register`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterForExhibitionRequest {
    #[serde(default = "default_attendees")]
    #[validate(custom(function = "shared::validation::validate_attendees_count"))]
    pub attendees_count: i32,
}

impl Default for RegisterForExhibitionRequest {
    fn default() -> Self {
        Self {
            attendees_count: default_attendees(),
        }
    }
}

fn default_attendees() -> i32 {
    1
}

/// Request body for rejecting a registration.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RejectRegistrationRequest {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

/// Filters for the reviewer registration listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRegistrationsQuery {
    pub exhibition_id: Option<i64>,
    pub status: Option<RegistrationStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Registration joined with visitor and exhibition labels for listings.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationDetails {
    #[serde(flatten)]
    pub registration: Registration,
    pub visitor_name: String,
    pub visitor_email: String,
    pub exhibition_title: String,
    pub exhibition_status: ExhibitionStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListRegistrationsResponse {
    pub data: Vec<RegistrationDetails>,
    pub pagination: Pagination,
}

/// One line of a visitor's queue status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub registration_id: i64,
    pub exhibition_id: i64,
    pub exhibition_title: String,
    pub queue_position: i32,
    pub submitted_at: DateTime<Utc>,
    pub attendees_count: i32,
    pub estimated_wait: String,
}

impl QueueEntry {
    /// Rough display estimate: one day per queue position, at least one.
    pub fn estimated_wait_for(position: i32) -> String {
        format!("{} day(s)", position.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub pending_registrations: Vec<QueueEntry>,
    pub total_in_queue: usize,
}
