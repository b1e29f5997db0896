//! Faser manager server library.
//!
//! Exposes the building blocks (config, state, error handling, middleware,
//! routes, board link, templates) so integration tests and the binary
//! entrypoint share them.

pub mod board;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod templates;
