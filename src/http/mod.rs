//! REST surface for `Person` nodes
//!
//! Hypermedia (HAL) collection and item resources under `/people`, plus the
//! `findByLastName` search and a `/status` endpoint.

pub mod error;
pub mod hal;
pub mod handler;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use handler::AppState;
pub use server::{router, HttpServer};
