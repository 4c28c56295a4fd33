//! Exhibition entity (database row mapping).

use chrono::NaiveDate;
use domain::models::{Exhibition, ExhibitionStatus};
use sqlx::FromRow;

/// Database enum for exhibition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "exhibition_status", rename_all = "UPPERCASE")]
pub enum ExhibitionStatusDb {
    Upcoming,
    Ongoing,
    Completed,
}

impl From<ExhibitionStatusDb> for ExhibitionStatus {
    fn from(status: ExhibitionStatusDb) -> Self {
        match status {
            ExhibitionStatusDb::Upcoming => ExhibitionStatus::Upcoming,
            ExhibitionStatusDb::Ongoing => ExhibitionStatus::Ongoing,
            ExhibitionStatusDb::Completed => ExhibitionStatus::Completed,
        }
    }
}

/// Database row mapping for the exhibitions table.
#[derive(Debug, Clone, FromRow)]
pub struct ExhibitionEntity {
    pub id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ExhibitionStatusDb,
}

impl From<ExhibitionEntity> for Exhibition {
    fn from(entity: ExhibitionEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            start_date: entity.start_date,
            end_date: entity.end_date,
            status: entity.status.into(),
        }
    }
}

/// Per-status registration counts for one exhibition.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct RegistrationCountsEntity {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub cancelled: i64,
}

impl From<RegistrationCountsEntity> for domain::models::RegistrationCounts {
    fn from(entity: RegistrationCountsEntity) -> Self {
        Self {
            total: entity.total,
            pending: entity.pending,
            approved: entity.approved,
            rejected: entity.rejected,
            cancelled: entity.cancelled,
        }
    }
}
