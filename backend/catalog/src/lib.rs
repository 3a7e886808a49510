//! # Catalog
//!
//! Shared shapes for the idea generator backend and its setup tool.
//!
//! ## Collections
//! - `components`: electronic parts, keyed by id
//! - `ideas`: saved or generated project ideas, keyed by id
//! - `preferences`: exactly one document, keyed [`DEFAULT_USER`]
//!
//! ## Seed Data
//! The five entries of [`seed::seed_components`] double as the fallback
//! catalog served whenever no live store is reachable.

pub mod models;
pub mod seed;

pub use models::{Component, Idea, IdeaRequest, Scalar, Stats, UserPreferences};

pub const DEFAULT_USER: &str = "default_user";
