//! fpsutil: samples all-interface network counters once per second and
//! appends the per-second deltas to a CSV file.
//!
//! Pipeline: [`system::CounterSource`] -> [`sampler::Sampler`] -> bounded
//! [`writer::row_queue`] -> [`writer::BufferedWriter`] -> file.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod sampler;
pub mod shutdown;
pub mod system;
pub mod writer;

pub use error::{Error, Result};
