#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! The world streaming core of a voxel engine: seeded terrain generation, per-subchunk
//! face-culled meshing and a scheduler that loads, meshes and unloads chunks around a
//! moving observer on a fixed pool of worker threads.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership primitives used between the tick loop and workers
//! * `engine_state` - The scheduler plus voxels, terrain, meshing and task management
//!
//! ## Architecture
//!
//! The crate keeps a clear separation between:
//! * Voxel data (blocks, chunks and the sparse world map)
//! * Terrain generation (noise, height bias and interchangeable density evaluators)
//! * Meshing (face culling and texture atlas UVs, handed to a `MeshSink`)
//! * Task scheduling and execution
//!
//! Drawing is left to whoever implements `MeshSink`; the crate ships a headless
//! `MeshRegistry` that only does handle bookkeeping.
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Point3;
//! use voxel_streaming::engine_state::{config::WorldConfig, WorldScheduler};
//!
//! let config = WorldConfig { view_distance: 4, ..WorldConfig::default() };
//! let mut scheduler = WorldScheduler::headless(config)?;
//! for step in 0..32 {
//!     scheduler.tick(Point3::new(step as f32 * 4.0, 150.0, 0.0))?;
//! }
//! # Ok::<(), voxel_streaming::engine_state::SchedulerError>(())
//! ```

use std::path::PathBuf;

use cgmath::{Point3, Vector3};
use log::info;

use engine_state::{config::WorldConfig, SchedulerError, WorldScheduler};

pub mod core;
pub mod engine_state;

/// Number of ticks the demo runs when no count is given.
pub const DEFAULT_DEMO_TICKS: usize = 64;

/// Blocks the demo observer moves along +X per tick.
const DEMO_STEP: f32 = 4.0;

/// Height the demo observer flies at.
const DEMO_ALTITUDE: f32 = 200.0;

/// Runs the streaming demo: loads the config named by the first command line argument
/// (defaults otherwise), then walks an observer along +X for the number of ticks given
/// by the second argument.
pub fn run() -> Result<(), SchedulerError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let mut args = std::env::args().skip(1);
    let config = match args.next().map(PathBuf::from) {
        Some(path) => {
            info!("Loading world config from {}", path.display());
            WorldConfig::load(path)?
        }
        None => WorldConfig::default(),
    };
    let ticks = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_DEMO_TICKS);

    run_demo(config, ticks)
}

/// Walks an observer along +X for `ticks` ticks and logs what got loaded.
pub fn run_demo(config: WorldConfig, ticks: usize) -> Result<(), SchedulerError> {
    let mut scheduler = WorldScheduler::headless(config)?;

    let mut observer = Point3::new(8.0, DEMO_ALTITUDE, 8.0);
    for tick in 0..ticks {
        scheduler.tick(observer)?;
        if tick % 16 == 0 {
            info!(
                "Tick {}: {:?}, {} live meshes",
                tick,
                scheduler.stats(),
                scheduler.mesh_sink().live_count()
            );
        }
        observer.x += DEMO_STEP;
    }
    scheduler.flush()?;

    let stats = scheduler.stats();
    info!(
        "Finished after {} ticks: {} chunks loaded, {} meshes applied, {} evicted, {} vertices live",
        ticks,
        stats.present,
        stats.meshed_total,
        stats.evicted_total,
        scheduler.mesh_sink().total_vertices()
    );

    match scheduler.pick(observer, Vector3::new(0.0, -1.0, 0.0), DEMO_ALTITUDE) {
        Some(hit) => info!(
            "Ground below the observer: {:?} at {:?}",
            hit.block, hit.block_position
        ),
        None => info!("No ground below the observer"),
    }

    Ok(())
}
