//! services/api/src/lib.rs
//!
//! The DailyStream service: adapters for the core ports, configuration, and
//! the axum web layer shared by the `api`, `openapi` and `feed` binaries.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
