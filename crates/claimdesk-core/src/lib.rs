//! # claimdesk-core
//!
//! Core crate for ClaimDesk. Contains configuration schemas, typed
//! identifiers, the key-value storage trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ClaimDesk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
