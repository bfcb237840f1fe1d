//! Configuration module for nineslice
//!
//! Provides types, discovery and loading for `nslice.toml`.

pub mod loader;
pub mod schema;

pub use schema::*;
