//! SQLite backend for the cytometry store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{PopulationRow, SqliteStore};

#[cfg(test)]
mod tests;
