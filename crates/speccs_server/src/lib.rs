//! HTTP service over the Speccs inventory store.
//!
//! # Responsibility
//! - Expose the store contract as JSON endpoints.
//! - Map store errors to HTTP status codes.
//!
//! # Invariants
//! - Storage work runs on the blocking pool, one request at a time per
//!   connection.
//! - The `X-Actor` header, when present, names the journal actor.

pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::router;
pub use server::{run, serve, ServerError};
pub use state::AppState;
