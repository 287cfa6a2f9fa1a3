//! Sequential trial loop: encode, invoke, extract, aggregate, persist.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};

use super::extractor::{self, ExtractOutcome};
use super::invoker::{InvokeError, Solver};
use super::report::{BatchReport, PersistError};
use super::stats::BatchStatistics;
use crate::encoding::{EncodeError, write_artifact};
use crate::schema::{
    BenchConfig, ConfigError, ExtractionSource, NamedPuzzle, PuzzleGrid, RunResult, SolverConfig,
};

/// Failure that aborts a single trial.
#[derive(Debug, thiserror::Error)]
pub enum TrialError {
    #[error(transparent)]
    Artifact(#[from] EncodeError),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    #[error("Cannot remove stale report {path}: {source}")]
    StaleReport {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure that aborts a whole batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("All {trials} trials failed; last error: {last}")]
    AllTrialsFailed {
        trials: usize,
        #[source]
        last: TrialError,
    },
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum TrialEvent<'a> {
    /// About to encode and launch trial `index` (zero-based).
    Started {
        index: usize,
        total: usize,
        name: Option<&'a str>,
        grid: &'a PuzzleGrid,
        params: &'a SolverConfig,
    },
    /// Trial `index` produced a result.
    Finished {
        index: usize,
        total: usize,
        result: &'a RunResult,
    },
}

/// Results collected so far, plus the trials that failed outright.
#[derive(Default)]
struct Tally {
    results: Vec<RunResult>,
    failures: usize,
    last_error: Option<TrialError>,
}

impl Tally {
    fn record(&mut self, trial: Result<RunResult, (RunResult, TrialError)>) -> &RunResult {
        let result = match trial {
            Ok(result) => result,
            Err((result, e)) => {
                self.failures += 1;
                self.last_error = Some(e);
                result
            }
        };
        self.results.push(result);
        &self.results[self.results.len() - 1]
    }
}

/// Drives trials against a solver.
pub struct BatchRunner<S: Solver> {
    solver: S,
    artifact_path: PathBuf,
    report_path: PathBuf,
    output_path: PathBuf,
    extraction: ExtractionSource,
}

impl<S: Solver> BatchRunner<S> {
    /// Create a runner using the paths and extraction source of `config`.
    pub fn new(solver: S, config: &BenchConfig) -> Self {
        Self {
            solver,
            artifact_path: config.artifact_path.clone(),
            report_path: config.report_path.clone(),
            output_path: config.output_path.clone(),
            extraction: config.extraction,
        }
    }

    /// Override the fitness source.
    pub fn with_extraction(mut self, extraction: ExtractionSource) -> Self {
        self.extraction = extraction;
        self
    }

    /// Override the JSON summary path.
    pub fn with_output_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = path.as_ref().to_path_buf();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Run one trial: write the artifact, run the solver, extract fitness.
    ///
    /// Unknown fitness is not an error; only artifact and process failures are.
    pub fn run_trial(
        &mut self,
        grid: &PuzzleGrid,
        params: &SolverConfig,
    ) -> Result<RunResult, TrialError> {
        self.attempt(grid, params).map_err(|(_, e)| e)
    }

    /// Like [`Self::run_trial`], but a failure also carries the seconds spent
    /// in the solver (zero when it never started).
    fn attempt(
        &mut self,
        grid: &PuzzleGrid,
        params: &SolverConfig,
    ) -> Result<RunResult, (f64, TrialError)> {
        write_artifact(&self.artifact_path, grid, params)
            .map_err(|e| (0.0, TrialError::from(e)))?;
        if self.extraction == ExtractionSource::ReportFile {
            self.clear_stale_report().map_err(|e| (0.0, e))?;
        }

        let start = Instant::now();
        let output = self
            .solver
            .run()
            .map_err(|e| (start.elapsed().as_secs_f64(), TrialError::from(e)))?;
        let elapsed = output.elapsed.as_secs_f64();
        let outcome = extractor::extract(self.extraction, &output.stdout, &self.report_path);

        Ok(match outcome {
            ExtractOutcome::Found {
                fitness,
                generation,
            } => RunResult::known(fitness, generation, elapsed),
            other => {
                let reason = other.reason().unwrap_or_default();
                warn!("Fitness unavailable: {}", reason);
                RunResult::unknown(elapsed, reason)
            }
        })
    }

    /// Repeat one puzzle `trials` times and persist the summary.
    pub fn run_comparison<F>(
        &mut self,
        grid: &PuzzleGrid,
        params: &SolverConfig,
        trials: usize,
        mut on_event: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: FnMut(TrialEvent<'_>),
    {
        params.validate()?;
        if trials == 0 {
            return Err(ConfigError::NoTrials.into());
        }
        info!("Running {} trials ({} empty cells)", trials, grid.empty_count());

        let mut tally = Tally::default();
        for index in 0..trials {
            on_event(TrialEvent::Started {
                index,
                total: trials,
                name: None,
                grid,
                params,
            });
            let result = tally.record(self.timed_trial(grid, params));
            on_event(TrialEvent::Finished {
                index,
                total: trials,
                result,
            });
        }

        self.finish(tally)
    }

    /// Run each puzzle once with its shared parameter set and persist the summary.
    pub fn run_suite<F>(
        &mut self,
        puzzles: &[NamedPuzzle],
        params: &SolverConfig,
        mut on_event: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: FnMut(TrialEvent<'_>),
    {
        params.validate()?;
        if puzzles.is_empty() {
            return Err(ConfigError::NoTrials.into());
        }
        info!("Running suite of {} puzzles", puzzles.len());

        let total = puzzles.len();
        let mut tally = Tally::default();
        for (index, puzzle) in puzzles.iter().enumerate() {
            on_event(TrialEvent::Started {
                index,
                total,
                name: Some(puzzle.name),
                grid: &puzzle.grid,
                params,
            });
            let empty = puzzle.grid.empty_count();
            let trial = self
                .timed_trial(&puzzle.grid, params)
                .map(|r| r.with_puzzle(puzzle.name, empty))
                .map_err(|(r, e)| (r.with_puzzle(puzzle.name, empty), e));
            let result = tally.record(trial);
            on_event(TrialEvent::Finished {
                index,
                total,
                result,
            });
        }

        self.finish(tally)
    }

    /// Run a trial, turning a failure into an unknown result that keeps its timing.
    fn timed_trial(
        &mut self,
        grid: &PuzzleGrid,
        params: &SolverConfig,
    ) -> Result<RunResult, (RunResult, TrialError)> {
        self.attempt(grid, params).map_err(|(elapsed, e)| {
            warn!("Trial failed: {}", e);
            (RunResult::unknown(elapsed, e.to_string()), e)
        })
    }

    fn finish(&self, tally: Tally) -> Result<BatchReport, BatchError> {
        let Tally {
            results,
            failures,
            last_error,
        } = tally;
        let trials = results.len();

        if failures == trials
            && let Some(last) = last_error
        {
            return Err(BatchError::AllTrialsFailed { trials, last });
        }

        let statistics = BatchStatistics::from_results(&results);
        let report = BatchReport {
            results,
            statistics,
        };
        report.save(&self.output_path)?;
        info!(
            "Batch done: {}/{} successes, summary written to {}",
            report.statistics.successes,
            trials,
            self.output_path.display()
        );

        Ok(report)
    }

    /// A report left by the previous trial must not be mistaken for this one's.
    fn clear_stale_report(&self) -> Result<(), TrialError> {
        match fs::remove_file(&self.report_path) {
            Ok(()) => {
                debug!("Removed stale {}", self.report_path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TrialError::StaleReport {
                path: self.report_path.clone(),
                source,
            }),
        }
    }
}
