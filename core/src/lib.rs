//! Verity Core Types
//!
//! This crate provides the foundational types used throughout the
//! validation engine:
//! - Value types (the `Value` enum with all scalar and container kinds)
//! - Shared object handles with instance identity (`ObjectRef`)
//! - Common error types

mod error;
mod object;
mod value;

pub use error::*;
pub use object::*;
pub use value::*;
