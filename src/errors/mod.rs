//! Centralized error handling for the playlist generator
//!
//! Only fetch failures and "nothing could be extracted" outcomes can fail a
//! run. Malformed records and enrichment misses are resolved inside their
//! stage and never surface here.
//!
//! # Error Categories
//!
//! - **Source Errors**: page fetching and headless rendering
//! - **Pipeline Errors**: empty extraction results, output writing
//! - **Configuration Errors**: loading and validating the layered config
//!
//! # Usage
//!
//! ```rust
//! use multicast_m3u::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("no relays configured"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for Pipeline Results
pub type PipelineResult<T> = Result<T, PipelineError>;
