//! Relata Prelude
//!
//! This crate re-exports the most frequently used public items from the relata
//! crates (`relata-core` and `relata-types`). Down-stream applications can depend on
//! `relata-prelude` to avoid long import lists.

#![deny(missing_docs)]

// Relations & errors ---------------------------------------------------------------------------

pub use relata_core::{FactError, FactResult, Relation, RelationConfig, RelationStats, Schema};

// Fields, comparers & patterns -----------------------------------------------------------------

pub use relata_types::{
    Binding, Comparer, DefaultComparer, Field, FnComparer, OptionComparer, bound, unbound,
};
