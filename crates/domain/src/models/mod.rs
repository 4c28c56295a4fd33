//! Domain models for the gallery backend.

pub mod art_piece;
pub mod artist;
pub mod dashboard;
pub mod exhibition;
pub mod identity;
pub mod permission;
pub mod registration;
pub mod visitor;

pub use art_piece::{ArtPiece, ArtPieceStatus, ExhibitedArtPiece};
pub use artist::{Artist, ArtistDetail};
pub use dashboard::{CatalogTotals, DashboardStats, GalleryTotals, RegistrationTotals};
pub use exhibition::{Exhibition, ExhibitionDetail, ExhibitionStatus, RegistrationCounts};
pub use identity::{UserIdentity, UserRole};
pub use permission::{authorize, Action};
pub use registration::{
    InvalidTransition, ListRegistrationsQuery, ListRegistrationsResponse, NewRegistration,
    QueueEntry, QueueStatus, RegisterForExhibitionRequest, Registration, RegistrationDetails,
    RegistrationStatus, RejectRegistrationRequest, SubmitRegistrationRequest, Transition,
};
pub use visitor::{NewVisitor, Visitor};
