//! Configuration types for wotr.
//!
//! This crate provides the configuration types used by wotr
//! for `.wotr/config.yaml` files.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
