//! Core constants used throughout the relata fact store
//!
//! Defaults and environment variable names shared by the configuration layer and tests.

/// Relation sizing defaults
pub mod capacity {
    /// Default number of composite-hash buckets reserved up front
    pub const DEFAULT_INITIAL_CAPACITY: usize = 64;

    /// Default number of distinct values reserved per field index
    pub const DEFAULT_INDEX_CAPACITY: usize = 16;
}

/// Arity limits
pub mod arity {
    /// Largest tuple arity with a provided `Schema` implementation
    pub const MAX_ARITY: usize = 8;
}

/// Composite hash mixing constants
pub mod hashing {
    /// Starting state of the composite hash before any field is mixed in
    pub const COMPOSITE_SEED: u64 = 0xcbf2_9ce4_8422_2325;

    /// Multiplier applied after each field is folded in
    pub const COMPOSITE_MULTIPLIER: u64 = 0x517c_c1b7_2722_0a95;
}

/// Environment variables read by `RelationConfig::from_env`
pub mod env {
    pub const INITIAL_CAPACITY: &str = "RELATA_INITIAL_CAPACITY";
    pub const INDEX_CAPACITY: &str = "RELATA_INDEX_CAPACITY";
    pub const SHARD_AMOUNT: &str = "RELATA_SHARD_AMOUNT";
}
