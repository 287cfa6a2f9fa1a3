//! Configuration types for solver parameters and benchmark runs.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default artifact the solver reads by convention.
pub const DEFAULT_ARTIFACT_PATH: &str = "entrada.in";

/// Default report file the solver appends to on every improvement.
pub const DEFAULT_REPORT_PATH: &str = "relatorio.txt";

/// Default JSON summary for comparison batches.
pub const DEFAULT_OUTPUT_PATH: &str = "comparacao_andressa.json";

/// Hyperparameters handed to the external genetic algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Individuals per generation.
    pub population: u32,
    /// Maximum generations.
    pub generations: u32,
    /// Mutation rate as a percentage (5.0 means 5%).
    pub mutation_rate: f32,
    /// Individuals copied unchanged into the next generation.
    pub elitism: u32,
    /// Tournament selection size.
    pub tournament_size: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population: 600,
            generations: 300,
            mutation_rate: 5.0,
            elitism: 5,
            tournament_size: 3,
        }
    }
}

impl SolverConfig {
    /// Validate solver parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population == 0 {
            return Err(ConfigError::InvalidPopulation);
        }
        if self.generations == 0 {
            return Err(ConfigError::InvalidGenerations);
        }
        if !self.mutation_rate.is_finite() || self.mutation_rate < 0.0 {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        if self.elitism > self.population {
            return Err(ConfigError::ElitismTooLarge {
                elitism: self.elitism,
                population: self.population,
            });
        }
        if self.tournament_size == 0 || self.tournament_size > self.population {
            return Err(ConfigError::InvalidTournament {
                size: self.tournament_size,
                population: self.population,
            });
        }
        Ok(())
    }
}

/// External solver command.
///
/// The solver locates the artifact by convention, so no arguments are
/// passed beyond the ones configured here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverCommand {
    /// Executable to launch.
    pub program: String,
    /// Fixed arguments.
    pub args: Vec<String>,
    /// Working directory for the child. `None` inherits ours.
    pub working_dir: Option<PathBuf>,
    /// Kill the solver after this many seconds. `None` waits forever.
    pub timeout_secs: Option<f64>,
}

impl Default for SolverCommand {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["agSudokuAleatorio.py".to_string()],
            working_dir: None,
            timeout_secs: None,
        }
    }
}

impl SolverCommand {
    /// Timeout as a duration, if one is configured and representable.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Human-readable command line for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Where the fitness of a finished run is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    /// Last line of the solver's report file.
    #[default]
    ReportFile,
    /// Progress lines on the solver's stdout.
    Stdout,
}

/// Published reference statistics used for comparison only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Baseline {
    /// Label printed in reports.
    pub label: String,
    /// Success rate in percent.
    pub success_rate: f64,
    /// Successful trials.
    pub successes: usize,
    /// Trials run.
    pub trials: usize,
    /// Mean best fitness.
    pub mean_fitness: f64,
    /// Standard deviation of best fitness.
    pub std_fitness: f64,
    /// Best (lowest) fitness.
    pub best_fitness: u32,
    /// Worst (highest) fitness.
    pub worst_fitness: u32,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            label: "TCC Andressa (UFU, 2025)".to_string(),
            success_rate: 20.0,
            successes: 2,
            trials: 10,
            mean_fitness: 4.2,
            std_fitness: 2.70,
            best_fitness: 0,
            worst_fitness: 8,
        }
    }
}

/// Top-level benchmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Solver to launch for every trial.
    pub solver: SolverCommand,
    /// Binary problem artifact, rewritten before every trial.
    pub artifact_path: PathBuf,
    /// Report file written by the solver.
    pub report_path: PathBuf,
    /// JSON summary written at the end of a batch.
    pub output_path: PathBuf,
    /// Fitness source.
    pub extraction: ExtractionSource,
    /// Solver parameters for comparison batches.
    pub params: SolverConfig,
    /// Trials per comparison batch.
    pub trials: usize,
    /// Reference statistics.
    pub baseline: Baseline,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            solver: SolverCommand::default(),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            extraction: ExtractionSource::ReportFile,
            params: SolverConfig {
                population: 1000,
                ..SolverConfig::default()
            },
            trials: 10,
            baseline: Baseline::default(),
        }
    }
}

impl BenchConfig {
    /// Validate the benchmark configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.program.trim().is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        if let Some(secs) = self.solver.timeout_secs
            && (secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err())
        {
            return Err(ConfigError::InvalidTimeout(secs));
        }
        if self.trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        self.params.validate()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Population must be positive")]
    InvalidPopulation,
    #[error("Generation count must be positive")]
    InvalidGenerations,
    #[error("Mutation rate must be a finite non-negative percentage, got {0}")]
    InvalidMutationRate(f32),
    #[error("Elitism count {elitism} exceeds population {population}")]
    ElitismTooLarge { elitism: u32, population: u32 },
    #[error("Tournament size {size} must be in 1..={population}")]
    InvalidTournament { size: u32, population: u32 },
    #[error("Solver command is empty")]
    EmptyCommand,
    #[error("Timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),
    #[error("Trial count must be positive")]
    NoTrials,
    #[error("Puzzle must have 9 rows of 9 cells, got {0}")]
    InvalidGridShape(String),
    #[error("Cell ({row}, {col}) holds {value}, expected 0-9")]
    InvalidCellValue { row: usize, col: usize, value: u8 },
    #[error("Unknown puzzle '{0}'")]
    UnknownPuzzle(String),
}
