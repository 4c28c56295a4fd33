//! Exhibition domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::art_piece::ExhibitedArtPiece;

/// Lifecycle status of an exhibition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExhibitionStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl ExhibitionStatus {
    /// Only upcoming and ongoing exhibitions take new registrations.
    pub fn accepts_registrations(&self) -> bool {
        matches!(self, ExhibitionStatus::Upcoming | ExhibitionStatus::Ongoing)
    }
}

impl std::fmt::Display for ExhibitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExhibitionStatus::Upcoming => write!(f, "UPCOMING"),
            ExhibitionStatus::Ongoing => write!(f, "ONGOING"),
            ExhibitionStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exhibition {
    pub id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ExhibitionStatus,
}

/// Registration totals for one exhibition, by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub cancelled: i64,
}

/// Exhibition with its art pieces and registration counts.
#[derive(Debug, Clone, Serialize)]
pub struct ExhibitionDetail {
    #[serde(flatten)]
    pub exhibition: Exhibition,
    pub art_pieces: Vec<ExhibitedArtPiece>,
    pub registration_counts: RegistrationCounts,
}
