//! rh-db: the catalog store.
//!
//! This crate provides SQLite-backed storage for the movie catalog with
//! connection pooling, embedded migrations, typed models, and query
//! modules.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
