//! Artist entity (database row mapping).

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ArtistEntity {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub contact_info: Option<String>,
}

impl From<ArtistEntity> for domain::models::Artist {
    fn from(entity: ArtistEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            bio: entity.bio,
            contact_info: entity.contact_info,
        }
    }
}
