//! Faser domain core.
//!
//! Pure logic shared by the database and API crates: identifier types,
//! domain errors, field-level validation and the pad board protocol.

pub mod board;
pub mod error;
pub mod types;
pub mod validation;
