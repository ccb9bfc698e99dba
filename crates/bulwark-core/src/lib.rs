//! Bulwark-core: Shared types and errors
//!
//! This crate provides the foundational types used across the Bulwark workspace.

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
