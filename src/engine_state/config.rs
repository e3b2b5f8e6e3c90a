//! World configuration.
//!
//! Settings are plain serde data so they can be loaded from a JSON file. Every field
//! has a default, so a config file only needs the values it changes:
//!
//! ```json
//! { "seed": 42, "view_distance": 8, "generator": "layered" }
//! ```

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::task_management::DrainPolicy;
use super::voxels::terrain::{LayeredEvaluator, ScalarEvaluator, TerrainGenerator};

/// Default view distance, in chunks.
pub const DEFAULT_VIEW_DISTANCE: u32 = 32;
/// Default cap on generation plus meshing jobs in flight.
pub const DEFAULT_MAX_JOBS_IN_FLIGHT: usize = 8;

/// Errors raised while loading or validating a [`WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read world config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for a `WorldConfig`.
    #[error("failed to parse world config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range.
    #[error("invalid world config: `{field}` {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Which density evaluator terrain generation uses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Voxel-by-voxel on the generation worker.
    #[default]
    Scalar,
    /// Layer batches fanned out over scoped threads.
    Layered,
}

/// Settings for a streamed world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Terrain seed
    pub seed: u64,
    /// Chunks are meshed out to this distance; generation reaches one ring further
    pub view_distance: u32,
    /// Cap on generation plus meshing jobs in flight
    pub max_jobs_in_flight: usize,
    /// Number of worker threads
    pub worker_count: usize,
    /// Density evaluator for terrain generation
    pub generator: GeneratorKind,
    /// How each tick waits for job results
    pub drain_policy: DrainPolicy,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: 0,
            view_distance: DEFAULT_VIEW_DISTANCE,
            max_jobs_in_flight: DEFAULT_MAX_JOBS_IN_FLIGHT,
            worker_count: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            generator: GeneratorKind::default(),
            drain_policy: DrainPolicy::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid {
                field: "worker_count",
                reason: "must be at least 1",
            });
        }
        if self.max_jobs_in_flight == 0 {
            return Err(ConfigError::Invalid {
                field: "max_jobs_in_flight",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Builds the terrain generator these settings describe.
    pub fn build_generator(&self) -> Arc<TerrainGenerator> {
        let generator = match self.generator {
            GeneratorKind::Scalar => TerrainGenerator::new(self.seed, Box::new(ScalarEvaluator)),
            GeneratorKind::Layered => {
                TerrainGenerator::new(self.seed, Box::new(LayeredEvaluator::default()))
            }
        };
        Arc::new(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = WorldConfig::from_json_str(r#"{ "seed": 7, "generator": "layered" }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.generator, GeneratorKind::Layered);
        assert_eq!(config.view_distance, DEFAULT_VIEW_DISTANCE);
        assert_eq!(config.max_jobs_in_flight, 8);
        assert_eq!(config.drain_policy, DrainPolicy::JoinAll);
        assert_eq!(config.build_generator().evaluator_name(), "layered");
    }

    #[test]
    fn drain_policy_parses_snake_case() {
        let config = WorldConfig::from_json_str(r#"{ "drain_policy": "poll" }"#).unwrap();
        assert_eq!(config.drain_policy, DrainPolicy::Poll);
    }

    #[test]
    fn zero_workers_are_rejected() {
        let err = WorldConfig::from_json_str(r#"{ "worker_count": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "worker_count",
                ..
            }
        ));
        assert!(matches!(
            WorldConfig::from_json_str("{ not json").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let config = WorldConfig {
            seed: 99,
            view_distance: 4,
            ..WorldConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(WorldConfig::from_json_str(&json).unwrap(), config);
    }
}
