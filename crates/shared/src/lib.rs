//! Shared utilities and common types for the gallery backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Signed identity claims (JWT)
//! - Page-number pagination
//! - Common validation logic

pub mod jwt;
pub mod pagination;
pub mod validation;
