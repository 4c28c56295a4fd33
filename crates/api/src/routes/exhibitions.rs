//! Exhibition read routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::ExhibitionDetail;
use persistence::repositories::ExhibitionRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/exhibitions/:id
///
/// Exhibition with its art pieces and registration counts by status.
pub async fn get_exhibition(
    State(state): State<AppState>,
    Path(exhibition_id): Path<i64>,
) -> Result<Json<ExhibitionDetail>, ApiError> {
    let repo = ExhibitionRepository::new(state.pool.clone());
    let detail = repo
        .find_detail(exhibition_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Exhibition not found".to_string()))?;

    Ok(Json(detail))
}
