pub mod auth;
pub mod transaction;
