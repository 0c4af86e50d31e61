//! Relata Types
//!
//! This crate defines the value-level building blocks shared by the relata crates:
//! binding patterns, equality comparers and field descriptors. It has no knowledge of
//! relations or indices, which live in `relata-core`.

#![deny(missing_docs)]

mod binding;
mod comparer;
mod field;

pub use binding::{Binding, bound, unbound};
pub use comparer::{ABSENT_HASH, Comparer, DefaultComparer, FnComparer, OptionComparer};
pub use field::Field;
