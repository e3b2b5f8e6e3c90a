//! # Voxel Streaming Demo Entry Point
//!
//! Walks an observer through a generated world and logs what the scheduler loads.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [world.json] [ticks]
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match voxel_streaming::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
