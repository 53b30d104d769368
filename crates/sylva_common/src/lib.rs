//! Shared foundational types used across the Sylva workspace.
//!
//! This crate provides interned identifiers for declaration and member names,
//! content hashing for source text, and the internal error type that signals a
//! bug in the forest bookkeeping rather than a problem in user input.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod result;

pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use result::{InternalError, SylvaResult};
