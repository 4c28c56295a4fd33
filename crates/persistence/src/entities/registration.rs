//! Registration entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Registration, RegistrationDetails, RegistrationStatus};
use domain::services::{PendingRegistration, RegistrationDecisionPayload};
use sqlx::FromRow;

use super::exhibition::ExhibitionStatusDb;

/// Database enum for registration status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "UPPERCASE")]
pub enum RegistrationStatusDb {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl From<RegistrationStatusDb> for RegistrationStatus {
    fn from(status: RegistrationStatusDb) -> Self {
        match status {
            RegistrationStatusDb::Pending => RegistrationStatus::Pending,
            RegistrationStatusDb::Approved => RegistrationStatus::Approved,
            RegistrationStatusDb::Rejected => RegistrationStatus::Rejected,
            RegistrationStatusDb::Cancelled => RegistrationStatus::Cancelled,
        }
    }
}

impl From<RegistrationStatus> for RegistrationStatusDb {
    fn from(status: RegistrationStatus) -> Self {
        match status {
            RegistrationStatus::Pending => RegistrationStatusDb::Pending,
            RegistrationStatus::Approved => RegistrationStatusDb::Approved,
            RegistrationStatus::Rejected => RegistrationStatusDb::Rejected,
            RegistrationStatus::Cancelled => RegistrationStatusDb::Cancelled,
        }
    }
}

/// Database row mapping for the registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationEntity {
    pub id: i64,
    pub visitor_id: i64,
    pub exhibition_id: i64,
    pub attendees_count: i32,
    pub status: RegistrationStatusDb,
    pub confirmed: bool,
    pub queue_position: Option<i32>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub visitor_notified: bool,
}

impl From<RegistrationEntity> for Registration {
    fn from(entity: RegistrationEntity) -> Self {
        Self {
            id: entity.id,
            visitor_id: entity.visitor_id,
            exhibition_id: entity.exhibition_id,
            attendees_count: entity.attendees_count,
            status: entity.status.into(),
            confirmed: entity.confirmed,
            queue_position: entity.queue_position,
            submitted_at: entity.submitted_at,
            reviewed_by: entity.reviewed_by,
            reviewed_at: entity.reviewed_at,
            rejection_reason: entity.rejection_reason,
            visitor_notified: entity.visitor_notified,
        }
    }
}

/// Registration joined with visitor and exhibition labels.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationDetailsEntity {
    #[sqlx(flatten)]
    pub registration: RegistrationEntity,
    pub visitor_name: String,
    pub visitor_email: String,
    pub exhibition_title: String,
    pub exhibition_status: ExhibitionStatusDb,
}

impl From<RegistrationDetailsEntity> for RegistrationDetails {
    fn from(entity: RegistrationDetailsEntity) -> Self {
        Self {
            registration: entity.registration.into(),
            visitor_name: entity.visitor_name,
            visitor_email: entity.visitor_email,
            exhibition_title: entity.exhibition_title,
            exhibition_status: entity.exhibition_status.into(),
        }
    }
}

/// Pending registration with the title of its exhibition.
#[derive(Debug, Clone, FromRow)]
pub struct PendingRegistrationEntity {
    #[sqlx(flatten)]
    pub registration: RegistrationEntity,
    pub exhibition_title: String,
}

impl From<PendingRegistrationEntity> for PendingRegistration {
    fn from(entity: PendingRegistrationEntity) -> Self {
        Self {
            registration: entity.registration.into(),
            exhibition_title: entity.exhibition_title,
        }
    }
}

/// A reviewed registration whose visitor has not been notified yet.
#[derive(Debug, Clone, FromRow)]
pub struct DecisionNotificationEntity {
    pub registration_id: i64,
    pub exhibition_id: i64,
    pub exhibition_title: String,
    pub visitor_name: String,
    pub visitor_email: String,
    pub status: RegistrationStatusDb,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<DecisionNotificationEntity> for RegistrationDecisionPayload {
    fn from(entity: DecisionNotificationEntity) -> Self {
        Self {
            registration_id: entity.registration_id,
            exhibition_id: entity.exhibition_id,
            exhibition_title: entity.exhibition_title,
            visitor_name: entity.visitor_name,
            visitor_email: entity.visitor_email,
            status: entity.status.into(),
            rejection_reason: entity.rejection_reason,
            reviewed_by: entity.reviewed_by,
            reviewed_at: entity.reviewed_at,
        }
    }
}
