//! Artist repository.

use domain::models::ArtistDetail;
use sqlx::PgPool;

use crate::entities::{ArtPieceEntity, ArtistEntity};
use crate::metrics::QueryTimer;

/// Repository for artist queries.
#[derive(Clone)]
pub struct ArtistRepository {
    pool: PgPool,
}

impl ArtistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ArtistEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_artist_by_id");
        let result = sqlx::query_as::<_, ArtistEntity>(
            r#"
            SELECT id, name, bio, contact_info
            FROM artists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_art_pieces(
        &self,
        artist_id: i64,
    ) -> Result<Vec<ArtPieceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_artist_art_pieces");
        let result = sqlx::query_as::<_, ArtPieceEntity>(
            r#"
            SELECT id, title, description, artist_id,
                   estimated_value::TEXT as estimated_value, status
            FROM art_pieces
            WHERE artist_id = $1
            ORDER BY title
            "#,
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Artist together with their art pieces.
    pub async fn find_detail(&self, id: i64) -> Result<Option<ArtistDetail>, sqlx::Error> {
        let Some(artist) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let art_pieces = self.list_art_pieces(id).await?;

        Ok(Some(ArtistDetail {
            artist: artist.into(),
            art_pieces: art_pieces.into_iter().map(Into::into).collect(),
        }))
    }
}
