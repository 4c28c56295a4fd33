//! Art piece entity (database row mapping).

use domain::models::{ArtPiece, ArtPieceStatus, ExhibitedArtPiece};
use sqlx::FromRow;

/// Database enum for art piece status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "art_piece_status", rename_all = "UPPERCASE")]
pub enum ArtPieceStatusDb {
    Available,
    Displayed,
    Unavailable,
}

impl From<ArtPieceStatusDb> for ArtPieceStatus {
    fn from(status: ArtPieceStatusDb) -> Self {
        match status {
            ArtPieceStatusDb::Available => ArtPieceStatus::Available,
            ArtPieceStatusDb::Displayed => ArtPieceStatus::Displayed,
            ArtPieceStatusDb::Unavailable => ArtPieceStatus::Unavailable,
        }
    }
}

/// Database row mapping for the art_pieces table.
///
/// `estimated_value` is selected as `estimated_value::TEXT`.
#[derive(Debug, Clone, FromRow)]
pub struct ArtPieceEntity {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub artist_id: i64,
    pub estimated_value: String,
    pub status: ArtPieceStatusDb,
}

impl From<ArtPieceEntity> for ArtPiece {
    fn from(entity: ArtPieceEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            artist_id: entity.artist_id,
            estimated_value: entity.estimated_value,
            status: entity.status.into(),
        }
    }
}

/// Art piece joined through exhibition_art_pieces.
#[derive(Debug, Clone, FromRow)]
pub struct ExhibitedArtPieceEntity {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub artist_id: i64,
    pub estimated_value: String,
    pub status: ArtPieceStatusDb,
    pub confirmed: bool,
}

impl From<ExhibitedArtPieceEntity> for ExhibitedArtPiece {
    fn from(entity: ExhibitedArtPieceEntity) -> Self {
        Self {
            art_piece: ArtPiece {
                id: entity.id,
                title: entity.title,
                description: entity.description,
                artist_id: entity.artist_id,
                estimated_value: entity.estimated_value,
                status: entity.status.into(),
            },
            confirmed: entity.confirmed,
        }
    }
}
