//! # userdesk-data
//!
//! SQLx plumbing for the userdesk service:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Tx`] | Per-request transaction, committed or rolled back on release |
//! | [`HasPool`] | Trait for application states that contain a database pool |
//! | [`DataError`] | Data-layer error: not found, conflict, database |
//! | [`SqlxErrorExt`] | `sqlx::Error` → `DataError`, unique violations → conflict |
//! | [`Window`] | `skip`/`limit` query parameters |
//! | [`connect`] | `sqlx::Any` pool construction for PostgreSQL or SQLite URLs |

pub mod error;
pub mod pool;
pub mod tx;
pub mod window;

pub use error::{DataError, DataResult, SqlxErrorExt};
pub use pool::{connect, Backend, PoolConfig};
pub use tx::{HasPool, Tx};
pub use window::Window;
