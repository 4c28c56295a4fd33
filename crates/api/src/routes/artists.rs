//! Artist read routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::ArtistDetail;
use persistence::repositories::ArtistRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/artists/:id
pub async fn get_artist(
    State(state): State<AppState>,
    Path(artist_id): Path<i64>,
) -> Result<Json<ArtistDetail>, ApiError> {
    let repo = ArtistRepository::new(state.pool.clone());
    let detail = repo
        .find_detail(artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found".to_string()))?;

    Ok(Json(detail))
}
