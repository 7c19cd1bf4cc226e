//! Core business logic for cineconnect-rs.

pub mod services;

pub use services::*;
