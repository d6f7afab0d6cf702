//! Hexagonal map generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod ascii;
pub mod classify;
pub mod export;
pub mod generator;
pub mod heights;
pub mod hydrology;
pub mod map;
pub mod objects;
pub mod rng;
pub mod terrain;
pub mod tiles;
