//! Common utilities and shared types for cineconnect-rs.
//!
//! This crate provides foundational components used across all cineconnect-rs
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Logging**: Tracing subscriber setup via [`logging::init`]
//!
//! # Example
//!
//! ```no_run
//! use cineconnect_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod logging;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
