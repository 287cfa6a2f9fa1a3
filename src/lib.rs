//! Sudoku GA benchmark - drive an external genetic-algorithm solver over
//! repeated trials and compare the outcome against a published baseline.
//!
//! This crate does not solve Sudoku. For every trial it writes a binary
//! problem description, runs the solver as a separate process, recovers the
//! best fitness from the solver's output and folds the result into batch
//! statistics.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Configuration, puzzle catalog and per-trial result types
//! - `encoding`: The binary problem artifact read by the solver
//! - `runner`: Process invocation, fitness extraction, statistics and reports
//!
//! # Example
//!
//! ```rust,no_run
//! use sudoku_bench::{
//!     encoding::write_artifact,
//!     schema::{REFERENCE, SolverConfig},
//! };
//!
//! // Write entrada.in for the reference puzzle
//! let bytes = write_artifact("entrada.in", &REFERENCE.grid, &SolverConfig::default())?;
//! println!("Wrote {} bytes", bytes);
//! # Ok::<(), sudoku_bench::encoding::EncodeError>(())
//! ```

pub mod encoding;
pub mod runner;
pub mod schema;

// Re-export commonly used types
pub use encoding::{EncodedProblem, write_artifact};
pub use runner::{BatchRunner, BatchStatistics, ProcessSolver};
pub use schema::{BenchConfig, PuzzleGrid, RunResult, SolverConfig};
