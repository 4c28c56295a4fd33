//! Visitor entity (database row mapping).

use sqlx::FromRow;

/// Database row mapping for the visitors table.
#[derive(Debug, Clone, FromRow)]
pub struct VisitorEntity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<VisitorEntity> for domain::models::Visitor {
    fn from(entity: VisitorEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
        }
    }
}
