//! Persistence access for bookshelf: a SQLite pool plus generic,
//! transaction-per-call CRUD helpers keyed by [`Entity`] types.

pub mod entity;
pub mod error;
pub mod filter;
pub mod migrate;
pub mod store;

pub use entity::{Entity, NewRecord};
pub use error::{Result, StoreError};
pub use filter::{Filters, Patch, Value};
pub use migrate::Migration;
pub use store::Database;

/// Re-exported so entity crates can derive `FromRow` and read raw rows.
pub use sqlx;
