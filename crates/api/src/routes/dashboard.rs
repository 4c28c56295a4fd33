//! Dashboard counters route.

use axum::{extract::State, Json};
use domain::models::{authorize, Action, DashboardStats, UserRole};
use persistence::repositories::{DashboardRepository, DashboardScope};
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthenticatedUser;

fn scope_for(role: UserRole) -> DashboardScope {
    DashboardScope {
        registrations: authorize(role, Action::ViewRegistrationStats),
        catalog: authorize(role, Action::ViewCatalogStats),
    }
}

/// GET /api/v1/dashboard/stats
///
/// Everyone sees gallery totals. Clerks and admins also get registration
/// counters; admins additionally get art-piece availability.
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<DashboardStats>, ApiError> {
    let repo = DashboardRepository::new(state.pool.clone());
    let stats = repo.get_stats(scope_for(identity.role)).await?;

    debug!(
        user_id = %identity.user_id,
        role = %identity.role,
        total_exhibitions = stats.gallery.total_exhibitions,
        "Fetched dashboard stats"
    );

    Ok(Json(stats))
}
