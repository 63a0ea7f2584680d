//! Crate-internal prelude.
//!
//! Derive macros shared by the date types.

pub use derive_more::Display;
