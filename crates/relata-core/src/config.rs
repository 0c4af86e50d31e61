//! Relation configuration
//!
//! A `RelationConfig` sizes the concurrent maps behind a relation. It can be built in
//! code, read from `RELATA_*` environment variables, or parsed from JSON.

use crate::constants::{capacity, env};
use crate::error::{FactError, FactResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sizing options for a relation's tuple set and field indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationConfig {
    /// Composite-hash buckets reserved in the tuple set
    pub initial_capacity: usize,
    /// Distinct values reserved in each field index
    pub index_capacity: usize,
    /// Shard count for the concurrent maps; `None` lets the map pick one.
    /// Must be a power of two greater than one.
    pub shard_amount: Option<usize>,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            initial_capacity: capacity::DEFAULT_INITIAL_CAPACITY,
            index_capacity: capacity::DEFAULT_INDEX_CAPACITY,
            shard_amount: None,
        }
    }
}

impl RelationConfig {
    /// Set the tuple set capacity
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Set the per-field index capacity
    pub fn with_index_capacity(mut self, index_capacity: usize) -> Self {
        self.index_capacity = index_capacity;
        self
    }

    /// Set an explicit shard count
    pub fn with_shard_amount(mut self, shard_amount: usize) -> Self {
        self.shard_amount = Some(shard_amount);
        self
    }

    /// Start from the defaults and apply any `RELATA_*` environment overrides
    pub fn from_env() -> FactResult<Self> {
        let mut config = Self::default();

        if let Some(value) = read_env_usize(env::INITIAL_CAPACITY)? {
            config.initial_capacity = value;
        }
        if let Some(value) = read_env_usize(env::INDEX_CAPACITY)? {
            config.index_capacity = value;
        }
        if let Some(value) = read_env_usize(env::SHARD_AMOUNT)? {
            config.shard_amount = Some(value);
        }

        config.validate()?;
        debug!(?config, "Loaded relation config from environment");
        Ok(config)
    }

    /// Parse a JSON document; missing keys fall back to the defaults
    pub fn from_json_str(json: &str) -> FactResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FactError::configuration(format!("invalid JSON config: {e}"), "json"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the concurrent maps cannot honour
    pub fn validate(&self) -> FactResult<()> {
        if let Some(shards) = self.shard_amount {
            if shards < 2 || !shards.is_power_of_two() {
                return Err(FactError::configuration(
                    format!("shard amount must be a power of two greater than one, got {shards}"),
                    "shard_amount",
                ));
            }
        }
        Ok(())
    }
}

fn read_env_usize(name: &str) -> FactResult<Option<usize>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<usize>().map(Some).map_err(|e| {
            FactError::configuration(format!("{name}={raw:?} is not a valid count: {e}"), name)
        }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(FactError::configuration(format!("{name} is unreadable: {e}"), name)),
    }
}
