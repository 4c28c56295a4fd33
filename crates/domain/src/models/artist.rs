//! Artist domain models.

use serde::{Deserialize, Serialize};

use super::art_piece::ArtPiece;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub contact_info: Option<String>,
}

/// Artist with the art pieces attributed to them.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    pub art_pieces: Vec<ArtPiece>,
}
