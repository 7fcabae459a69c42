//! Core data models for the configuration asset store.
//!
//! `bucket` and `object` map to database tables via `sqlx::FromRow`.
//! `listing` and `upload` are the contracts between the flat store and the
//! virtual folder view built on top of it.

pub mod bucket;
pub mod listing;
pub mod object;
pub mod upload;
