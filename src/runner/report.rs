//! JSON persistence and console rendering of batch results.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::stats::{BatchStatistics, Comparison, Verdict};
use crate::schema::{Baseline, RunResult};

const RULE_WIDTH: usize = 70;

/// Errors raised while writing or reading the JSON summary.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Cannot write summary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot encode summary {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON summary of one batch: `{"resultados": [...], "estatisticas": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    #[serde(rename = "resultados")]
    pub results: Vec<RunResult>,
    #[serde(rename = "estatisticas")]
    pub statistics: BatchStatistics,
}

impl BatchReport {
    /// Write pretty-printed JSON to `path`, replacing any previous summary.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let path = path.as_ref();
        let io_err = |source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}

/// Load a summary written by [`BatchReport::save`].
pub fn load_report<P: AsRef<Path>>(path: P) -> io::Result<BatchReport> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn or_unknown<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

/// Baseline comparison printed at the end of a comparison batch.
pub struct ComparisonReport<'a> {
    pub statistics: &'a BatchStatistics,
    pub baseline: &'a Baseline,
}

impl ComparisonReport<'_> {
    pub fn comparison(&self) -> Comparison {
        Comparison::new(self.statistics, self.baseline)
    }
}

impl fmt::Display for ComparisonReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.statistics;
        let base = self.baseline;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "{}", rule)?;
        writeln!(f, "COMPARISON REPORT")?;
        writeln!(f, "{}", rule)?;
        writeln!(f)?;

        writeln!(f, "Reference: {}", base.label)?;
        writeln!(
            f,
            "   Success rate: {:.1}% ({}/{})",
            base.success_rate, base.successes, base.trials
        )?;
        writeln!(
            f,
            "   Mean fitness: {:.2} ± {:.2}",
            base.mean_fitness, base.std_fitness
        )?;
        writeln!(
            f,
            "   Best: {}  |  Worst: {}",
            base.best_fitness, base.worst_fitness
        )?;
        writeln!(f)?;

        writeln!(f, "Measured:")?;
        writeln!(
            f,
            "   Success rate: {:.1}% ({}/{})",
            stats.success_rate, stats.successes, stats.trials
        )?;
        match (stats.mean_fitness, stats.std_fitness) {
            (Some(mean), Some(std)) => writeln!(f, "   Mean fitness: {:.2} ± {:.2}", mean, std)?,
            _ => writeln!(f, "   Mean fitness: undefined (no trial reported a fitness)")?,
        }
        writeln!(
            f,
            "   Best: {}  |  Worst: {}",
            or_unknown(stats.min_fitness),
            or_unknown(stats.max_fitness)
        )?;
        writeln!(f, "   Mean time: {:.1}s", stats.mean_time)?;
        let unknown = stats.trials - stats.known_count();
        if unknown > 0 {
            writeln!(f, "   Unknown results: {}", unknown)?;
        }
        writeln!(f)?;

        let comparison = self.comparison();
        writeln!(f, "Direct comparison:")?;
        match comparison.success_verdict() {
            Verdict::Better => writeln!(
                f,
                "   Success rate: +{:.1}% (better)",
                comparison.success_rate_delta
            )?,
            Verdict::Equal => writeln!(f, "   Success rate: equal ({:.1}%)", base.success_rate)?,
            Verdict::Worse => writeln!(
                f,
                "   Success rate: {:.1}% (worse)",
                comparison.success_rate_delta
            )?,
        }
        match (comparison.fitness_verdict(), comparison.fitness_delta) {
            (Some(Verdict::Better), Some(delta)) => {
                writeln!(f, "   Mean fitness: {:.2} better", delta)?
            }
            (Some(Verdict::Worse), Some(delta)) => {
                writeln!(f, "   Mean fitness: {:.2} worse", delta.abs())?
            }
            (Some(_), _) => writeln!(f, "   Mean fitness: equal")?,
            (None, _) => writeln!(f, "   Mean fitness: undefined")?,
        }
        write!(f, "{}", rule)
    }
}

/// Per-puzzle table printed at the end of a suite batch.
pub struct SuiteSummary<'a> {
    pub results: &'a [RunResult],
    pub statistics: &'a BatchStatistics,
}

impl fmt::Display for SuiteSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(60);
        writeln!(
            f,
            "{:<12} {:<8} {:<10} {:<10} Status",
            "Puzzle", "Empty", "Fitness", "Time(s)"
        )?;
        writeln!(f, "{}", rule)?;
        for r in self.results {
            writeln!(
                f,
                "{:<12} {:<8} {:<10} {:<10.2} {}",
                r.name.as_deref().unwrap_or("-"),
                or_unknown(r.empty_cells),
                r.fitness_label(),
                r.elapsed_seconds,
                if r.success { "OK" } else { "FAILED" }
            )?;
        }
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "Success rate: {}/{} ({:.1}%)",
            self.statistics.successes, self.statistics.trials, self.statistics.success_rate
        )?;
        write!(f, "Total time: {:.2} seconds", self.statistics.total_time)
    }
}
