//! Exhibition repository for read-only gallery views.

use domain::models::ExhibitionDetail;
use sqlx::PgPool;

use crate::entities::{ExhibitedArtPieceEntity, ExhibitionEntity, RegistrationCountsEntity};
use crate::metrics::QueryTimer;

/// Repository for exhibition queries.
#[derive(Clone)]
pub struct ExhibitionRepository {
    pool: PgPool,
}

impl ExhibitionRepository {
    /// Creates a new ExhibitionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an exhibition by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ExhibitionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_exhibition_by_id");
        let result = sqlx::query_as::<_, ExhibitionEntity>(
            r#"
            SELECT id, title, start_date, end_date, status
            FROM exhibitions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Art pieces linked to an exhibition, in link order.
    pub async fn list_art_pieces(
        &self,
        exhibition_id: i64,
    ) -> Result<Vec<ExhibitedArtPieceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_exhibition_art_pieces");
        let result = sqlx::query_as::<_, ExhibitedArtPieceEntity>(
            r#"
            SELECT ap.id, ap.title, ap.description, ap.artist_id,
                   ap.estimated_value::TEXT as estimated_value, ap.status, eap.confirmed
            FROM exhibition_art_pieces eap
            JOIN art_pieces ap ON ap.id = eap.art_piece_id
            WHERE eap.exhibition_id = $1
            ORDER BY eap.id
            "#,
        )
        .bind(exhibition_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Registration totals for an exhibition, by status.
    pub async fn registration_counts(
        &self,
        exhibition_id: i64,
    ) -> Result<RegistrationCountsEntity, sqlx::Error> {
        let timer = QueryTimer::new("count_exhibition_registrations");
        let result = sqlx::query_as::<_, RegistrationCountsEntity>(
            r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE status = 'PENDING') as pending,
                COUNT(*) FILTER (WHERE status = 'APPROVED') as approved,
                COUNT(*) FILTER (WHERE status = 'REJECTED') as rejected,
                COUNT(*) FILTER (WHERE status = 'CANCELLED') as cancelled
            FROM registrations
            WHERE exhibition_id = $1
            "#,
        )
        .bind(exhibition_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Exhibition with its art pieces and registration counts.
    pub async fn find_detail(&self, id: i64) -> Result<Option<ExhibitionDetail>, sqlx::Error> {
        let Some(exhibition) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let (art_pieces, counts) =
            tokio::try_join!(self.list_art_pieces(id), self.registration_counts(id))?;

        Ok(Some(ExhibitionDetail {
            exhibition: exhibition.into(),
            art_pieces: art_pieces.into_iter().map(Into::into).collect(),
            registration_counts: counts.into(),
        }))
    }
}
