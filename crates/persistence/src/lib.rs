//! Persistence layer for the gallery backend.
//!
//! This crate contains:
//! - Database connection management and embedded migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations, including the PostgreSQL queue store

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
