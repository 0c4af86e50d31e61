//! Core functionality for relata fact relations.
//!
//! A [`Relation`] stores fixed-arity tuples ("facts") with one composite uniqueness
//! constraint and one secondary index per field. Any subset of fields can act as a search
//! key: exact operations probe by composite hash, partial patterns drive off the first
//! bound field's index and filter the candidates with a residual predicate.

/// Composite hashing over all fields of a tuple
pub mod composite_key;
/// Relation sizing and environment/JSON configuration
pub mod config;
/// Defaults and environment variable names
pub mod constants;
/// Error types for relation operations
pub mod error;
/// Per-field secondary indices
pub mod field_index;
/// Driving-index selection and residual predicates
pub mod pattern;
/// The relation itself
pub mod relation;
/// Per-position access for tuple schemas of arity 1 to 8
pub mod schema;
/// Hash-bucketed concurrent tuple storage
pub mod tuple_set;

pub use config::RelationConfig;
pub use error::{FactError, FactResult};
pub use field_index::{FieldIndex, FieldIndexStats};
pub use pattern::{BindingPlan, Probe};
pub use relation::{Matches, Relation, RelationStats};
pub use schema::Schema;
pub use tuple_set::TupleSet;

pub use relata_types::{Binding, Comparer, DefaultComparer, Field, FnComparer, OptionComparer, bound, unbound};
