//! Utility functions for the playlist generator
//!
//! - `time` for timezone validation and the generation timestamp

pub mod time;
