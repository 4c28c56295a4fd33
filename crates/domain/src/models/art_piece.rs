//! Art piece domain models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtPieceStatus {
    Available,
    Displayed,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtPiece {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub artist_id: i64,
    /// Decimal value rendered as text to keep full precision.
    pub estimated_value: String,
    pub status: ArtPieceStatus,
}

/// An art piece as linked to an exhibition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExhibitedArtPiece {
    #[serde(flatten)]
    pub art_piece: ArtPiece,
    /// Whether the placement in the exhibition is confirmed.
    pub confirmed: bool,
}
