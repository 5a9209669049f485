//! Playlist-side stages: the name block list and per-relay synthesis

pub mod filter_engine;
pub mod generator;

pub use filter_engine::{FilterEngine, FilterOutcome};
pub use generator::{PlaylistGenerator, SynthesisOutcome};
