//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod art_piece;
pub mod artist;
pub mod exhibition;
pub mod registration;
pub mod visitor;

pub use art_piece::{ArtPieceEntity, ArtPieceStatusDb, ExhibitedArtPieceEntity};
pub use artist::ArtistEntity;
pub use exhibition::{ExhibitionEntity, ExhibitionStatusDb, RegistrationCountsEntity};
pub use registration::{
    DecisionNotificationEntity, PendingRegistrationEntity, RegistrationDetailsEntity,
    RegistrationEntity, RegistrationStatusDb,
};
pub use visitor::VisitorEntity;
