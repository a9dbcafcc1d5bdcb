//! Trait definitions for the Lorebook service boundary.
//!
//! The consolidation engine never talks to a network directly; it requires a
//! [`LorebookDriver`] that turns a [`lorebook_core::GenerateRequest`] into a
//! [`lorebook_core::GenerateResponse`] or a classifiable error.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::LorebookDriver;
