//! SQLite backend for the trolley cart store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The same file also carries
//! the product read model that backs the [`Catalog`] join at recovery
//! time.
//!
//! [`Catalog`]: trolley_core::catalog::Catalog

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
