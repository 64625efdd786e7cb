// Library crate root.
//
// This crate is used both as a binary (src/main.rs) and as a library.
// The slicing engine lives here so other front ends can drive it; the binary
// is only argument parsing and console output.

pub mod im;
pub mod config;
pub mod error;
pub mod grid;
pub mod job;
pub mod console;
pub mod runner;

pub use config::{EdgeClamp, SliceConfig};
pub use console::{Console, NullObserver, RunObserver};
pub use error::{Error, Result};
pub use grid::{GridPlan, SliceRect, SliceRects, plan};
pub use job::ImageJob;
pub use runner::{RunCanceler, RunHandle, RunOutcome, RunResult, RunToken, RunnerState, SliceRunner};

#[cfg(test)]
pub mod test_helpers;
