//! Dashboard counters repository.

use domain::models::{CatalogTotals, DashboardStats, GalleryTotals, RegistrationTotals};
use sqlx::{PgPool, Row};

use crate::metrics::QueryTimer;

/// Which optional counter groups to load. Gallery totals are always loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardScope {
    pub registrations: bool,
    pub catalog: bool,
}

/// Repository for dashboard counter queries.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gallery totals plus the counter groups enabled in `scope`.
    pub async fn get_stats(&self, scope: DashboardScope) -> Result<DashboardStats, sqlx::Error> {
        let timer = QueryTimer::new("get_dashboard_stats");
        let result = async {
            let gallery = self.get_gallery_totals().await?;
            let registrations = if scope.registrations {
                Some(self.get_registration_totals().await?)
            } else {
                None
            };
            let catalog = if scope.catalog {
                Some(self.get_catalog_totals().await?)
            } else {
                None
            };
            Ok(DashboardStats {
                gallery,
                registrations,
                catalog,
            })
        }
        .await;
        timer.record();
        result
    }

    async fn get_gallery_totals(&self) -> Result<GalleryTotals, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM artists) as total_artists,
                (SELECT COUNT(*) FROM exhibitions) as total_exhibitions,
                (SELECT COUNT(*) FROM visitors) as total_visitors,
                (SELECT COUNT(*) FROM art_pieces) as total_artpieces,
                (SELECT COUNT(*) FROM exhibitions WHERE status = 'ONGOING') as ongoing_exhibitions,
                (SELECT COUNT(*) FROM exhibitions WHERE status = 'UPCOMING') as upcoming_exhibitions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(GalleryTotals {
            total_artists: row.get::<i64, _>("total_artists"),
            total_exhibitions: row.get::<i64, _>("total_exhibitions"),
            total_visitors: row.get::<i64, _>("total_visitors"),
            total_artpieces: row.get::<i64, _>("total_artpieces"),
            ongoing_exhibitions: row.get::<i64, _>("ongoing_exhibitions"),
            upcoming_exhibitions: row.get::<i64, _>("upcoming_exhibitions"),
        })
    }

    async fn get_registration_totals(&self) -> Result<RegistrationTotals, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE status = 'PENDING') as pending,
                COUNT(*) FILTER (WHERE status = 'APPROVED') as approved,
                COUNT(*) FILTER (WHERE status = 'REJECTED') as rejected
            FROM registrations
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(RegistrationTotals {
            total_registrations: row.get::<i64, _>("total"),
            pending_registrations: row.get::<i64, _>("pending"),
            confirmed_registrations: row.get::<i64, _>("approved"),
            rejected_registrations: row.get::<i64, _>("rejected"),
        })
    }

    async fn get_catalog_totals(&self) -> Result<CatalogTotals, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'AVAILABLE') as available,
                COUNT(*) FILTER (WHERE status = 'DISPLAYED') as displayed
            FROM art_pieces
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogTotals {
            artpieces_available: row.get::<i64, _>("available"),
            artpieces_displayed: row.get::<i64, _>("displayed"),
        })
    }
}
