//! Descriptive statistics over a batch of trials and the baseline comparison.

use serde::{Deserialize, Serialize};

use crate::schema::{Baseline, RunResult};

/// Differences smaller than this count as a tie.
const TIE_EPSILON: f64 = 1e-9;

/// Aggregate statistics of one batch.
///
/// Fitness aggregates are `None` when no trial produced a fitness; they are
/// written as `null`, never as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    /// Per-trial fitness in trial order, `None` for unknown.
    #[serde(rename = "fitness_valores")]
    pub fitness_values: Vec<Option<u32>>,
    /// Percentage of trials that reached fitness 0.
    #[serde(rename = "taxa_sucesso")]
    pub success_rate: f64,
    #[serde(rename = "fitness_medio")]
    pub mean_fitness: Option<f64>,
    /// Population standard deviation.
    #[serde(rename = "fitness_desvio")]
    pub std_fitness: Option<f64>,
    #[serde(rename = "fitness_min")]
    pub min_fitness: Option<u32>,
    #[serde(rename = "fitness_max")]
    pub max_fitness: Option<u32>,
    /// Mean elapsed seconds over all trials, known fitness or not.
    #[serde(rename = "tempo_medio")]
    pub mean_time: f64,
    #[serde(rename = "tempo_total")]
    pub total_time: f64,
    #[serde(rename = "sucessos")]
    pub successes: usize,
    #[serde(rename = "testes")]
    pub trials: usize,
}

impl BatchStatistics {
    /// Compute statistics from trial results.
    ///
    /// Rates and times are zero for an empty slice.
    pub fn from_results(results: &[RunResult]) -> Self {
        let trials = results.len();
        let fitness_values: Vec<Option<u32>> = results.iter().map(|r| r.fitness).collect();
        let known: Vec<f64> = fitness_values.iter().flatten().map(|&f| f as f64).collect();
        let successes = results.iter().filter(|r| r.success).count();
        let total_time: f64 = results.iter().map(|r| r.elapsed_seconds).sum();

        let (mean_fitness, std_fitness) = if known.is_empty() {
            (None, None)
        } else {
            let n = known.len() as f64;
            let mean = known.iter().sum::<f64>() / n;
            let variance = known.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            (Some(mean), Some(variance.sqrt()))
        };

        let (success_rate, mean_time) = if trials == 0 {
            (0.0, 0.0)
        } else {
            (
                100.0 * successes as f64 / trials as f64,
                total_time / trials as f64,
            )
        };

        Self {
            min_fitness: fitness_values.iter().flatten().copied().min(),
            max_fitness: fitness_values.iter().flatten().copied().max(),
            fitness_values,
            success_rate,
            mean_fitness,
            std_fitness,
            mean_time,
            total_time,
            successes,
            trials,
        }
    }

    /// Trials whose fitness is known.
    pub fn known_count(&self) -> usize {
        self.fitness_values.iter().flatten().count()
    }

    /// True when every trial ended with unknown fitness.
    pub fn is_undefined(&self) -> bool {
        self.mean_fitness.is_none()
    }
}

/// Direction of a difference against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Better,
    Equal,
    Worse,
}

impl Verdict {
    /// Classify a delta where positive means better.
    fn from_delta(delta: f64) -> Self {
        if delta > TIE_EPSILON {
            Verdict::Better
        } else if delta < -TIE_EPSILON {
            Verdict::Worse
        } else {
            Verdict::Equal
        }
    }
}

/// Measured statistics relative to a baseline. Positive deltas mean the
/// measured solver did better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// `success_rate - baseline.success_rate`.
    pub success_rate_delta: f64,
    /// `baseline.mean_fitness - mean_fitness`; lower fitness is better.
    pub fitness_delta: Option<f64>,
}

impl Comparison {
    pub fn new(stats: &BatchStatistics, baseline: &Baseline) -> Self {
        Self {
            success_rate_delta: stats.success_rate - baseline.success_rate,
            fitness_delta: stats.mean_fitness.map(|m| baseline.mean_fitness - m),
        }
    }

    pub fn success_verdict(&self) -> Verdict {
        Verdict::from_delta(self.success_rate_delta)
    }

    /// `None` when the measured mean is undefined.
    pub fn fitness_verdict(&self) -> Option<Verdict> {
        self.fitness_delta.map(Verdict::from_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(fitness: &[Option<u32>]) -> Vec<RunResult> {
        fitness
            .iter()
            .enumerate()
            .map(|(i, f)| match f {
                Some(f) => RunResult::known(*f, None, 1.0 + i as f64),
                None => RunResult::unknown(0.5, "no fitness reported"),
            })
            .collect()
    }

    #[test]
    fn test_success_rate_ten_trials() {
        let fitness = [4, 0, 3, 5, 8, 1, 0, 2, 6, 7];
        let batch = results(&fitness.map(Some));
        let stats = BatchStatistics::from_results(&batch);

        assert_eq!(stats.successes, 2);
        assert!((stats.success_rate - 20.0).abs() < 1e-12);
        let winners: Vec<usize> = batch
            .iter()
            .enumerate()
            .filter(|(_, r)| r.success)
            .map(|(i, _)| i + 1)
            .collect();
        assert_eq!(winners, vec![2, 7]);
        assert_eq!(stats.min_fitness, Some(0));
        assert_eq!(stats.max_fitness, Some(8));
    }

    #[test]
    fn test_mean_and_population_std() {
        let fitness = [2, 4, 4, 4, 5, 5, 7, 9].map(Some);
        let stats = BatchStatistics::from_results(&results(&fitness));
        assert!((stats.mean_fitness.unwrap() - 5.0).abs() < 1e-12);
        assert!((stats.std_fitness.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_fitness_excluded_but_timed() {
        let stats = BatchStatistics::from_results(&results(&[Some(3), None, Some(5)]));

        assert_eq!(stats.fitness_values, vec![Some(3), None, Some(5)]);
        assert_eq!(stats.known_count(), 2);
        assert!((stats.mean_fitness.unwrap() - 4.0).abs() < 1e-12);
        assert!((stats.std_fitness.unwrap() - 1.0).abs() < 1e-12);
        // Times: 1.0, 0.5, 3.0
        assert!((stats.total_time - 4.5).abs() < 1e-12);
        assert!((stats.mean_time - 1.5).abs() < 1e-12);
        assert!((stats.success_rate - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_unknown_is_undefined() {
        let stats = BatchStatistics::from_results(&results(&[None, None]));

        assert!(stats.is_undefined());
        assert_eq!(stats.std_fitness, None);
        assert_eq!(stats.min_fitness, None);
        assert_eq!(stats.max_fitness, None);

        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["fitness_medio"].is_null());
        assert!(json["fitness_desvio"].is_null());
        assert!(json["fitness_min"].is_null());
        assert_eq!(json["fitness_valores"], serde_json::json!([null, null]));
        assert_eq!(json["tempo_total"], 1.0);
    }

    #[test]
    fn test_fitness_delta_sign() {
        let stats = BatchStatistics {
            mean_fitness: Some(3.0),
            success_rate: 40.0,
            ..BatchStatistics::from_results(&[])
        };
        let comparison = Comparison::new(&stats, &Baseline::default());

        assert!((comparison.fitness_delta.unwrap() - 1.2).abs() < 1e-9);
        assert_eq!(comparison.fitness_verdict(), Some(Verdict::Better));
        assert!((comparison.success_rate_delta - 20.0).abs() < 1e-12);
        assert_eq!(comparison.success_verdict(), Verdict::Better);
    }

    #[test]
    fn test_comparison_worse_and_equal() {
        let stats = BatchStatistics {
            mean_fitness: Some(6.0),
            success_rate: 20.0,
            ..BatchStatistics::from_results(&[])
        };
        let comparison = Comparison::new(&stats, &Baseline::default());
        assert_eq!(comparison.fitness_verdict(), Some(Verdict::Worse));
        assert_eq!(comparison.success_verdict(), Verdict::Equal);
    }

    #[test]
    fn test_comparison_undefined_fitness() {
        let stats = BatchStatistics::from_results(&results(&[None]));
        let comparison = Comparison::new(&stats, &Baseline::default());
        assert_eq!(comparison.fitness_delta, None);
        assert_eq!(comparison.fitness_verdict(), None);
        assert_eq!(comparison.success_verdict(), Verdict::Worse);
    }
}
