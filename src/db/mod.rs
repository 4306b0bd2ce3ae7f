//! Database module: models and schema for the user token store.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite)
//! - `actor.rs`: actor owning the pool; callers use [`DbActorHandle`]

pub mod actor;
pub mod models;
pub mod schema;

pub use actor::{DbActorHandle, spawn};
pub use models::{DbUser, NewUser};
pub use schema::SQLITE_INIT;
