//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&mut PgConnection` as the first argument, so callers can
//! pass either a pooled connection or an open transaction (`&mut *tx`).

pub mod pad_repo;

pub use pad_repo::PadRepo;
