//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation.

pub mod chunk_generation_task;
