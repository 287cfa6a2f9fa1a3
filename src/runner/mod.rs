//! Benchmark runner: drives the external solver and aggregates its results.
//!
//! # Overview
//!
//! - **Invoker** (`invoker`): runs the solver command as a blocking child
//!   process, with an optional timeout
//! - **Extractor** (`extractor`): recovers the best fitness from stdout or the
//!   solver's report file
//! - **Statistics** (`stats`): success rate, fitness mean/deviation, timing,
//!   baseline comparison
//! - **Batch** (`batch`): the sequential encode, invoke, extract loop
//! - **Report** (`report`): JSON summary and console rendering
//!
//! # Example
//!
//! ```rust,no_run
//! use sudoku_bench::runner::{BatchRunner, ComparisonReport, ProcessSolver};
//! use sudoku_bench::schema::{BenchConfig, REFERENCE};
//!
//! let config = BenchConfig::default();
//! let solver = ProcessSolver::new(config.solver.clone());
//! let mut runner = BatchRunner::new(solver, &config);
//!
//! let report = runner.run_comparison(&REFERENCE.grid, &config.params, config.trials, |_| {})?;
//!
//! println!(
//!     "{}",
//!     ComparisonReport {
//!         statistics: &report.statistics,
//!         baseline: &config.baseline,
//!     }
//! );
//! # Ok::<(), sudoku_bench::runner::BatchError>(())
//! ```
//!
//! Trials never overlap: the artifact, report and summary paths are shared
//! by every trial of a batch.

mod batch;
mod extractor;
mod invoker;
mod report;
mod stats;

pub use batch::{BatchError, BatchRunner, TrialError, TrialEvent};
pub use extractor::{ExtractOutcome, extract, from_report_file, from_report_text, from_stdout};
pub use invoker::{InvokeError, ProcessSolver, Solver, SolverOutput};
pub use report::{BatchReport, ComparisonReport, PersistError, SuiteSummary, load_report};
pub use stats::{BatchStatistics, Comparison, Verdict};
