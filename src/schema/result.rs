//! Per-trial result records.

use serde::{Deserialize, Serialize};

/// Outcome of one trial (encode, invoke, extract).
///
/// Field names follow the JSON summary consumed by the analysis notebooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Puzzle name, for suite runs.
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Empty cells in the puzzle, for suite runs.
    #[serde(
        rename = "celulas_vazias",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub empty_cells: Option<usize>,
    /// Best fitness found. `None` when it could not be recovered.
    pub fitness: Option<u32>,
    /// Generation that produced the reported fitness, when the solver says.
    #[serde(rename = "geracao", default)]
    pub generation: Option<u32>,
    /// Wall-clock seconds, recorded even when fitness is unknown.
    #[serde(rename = "tempo")]
    pub elapsed_seconds: f64,
    /// `fitness == Some(0)`.
    #[serde(rename = "sucesso")]
    pub success: bool,
    /// Why the trial produced no fitness.
    #[serde(rename = "erro", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    /// Result with a known fitness.
    pub fn known(fitness: u32, generation: Option<u32>, elapsed_seconds: f64) -> Self {
        Self {
            name: None,
            empty_cells: None,
            fitness: Some(fitness),
            generation,
            elapsed_seconds,
            success: fitness == 0,
            error: None,
        }
    }

    /// Result whose fitness could not be determined.
    pub fn unknown(elapsed_seconds: f64, reason: impl Into<String>) -> Self {
        Self {
            name: None,
            empty_cells: None,
            fitness: None,
            generation: None,
            elapsed_seconds,
            success: false,
            error: Some(reason.into()),
        }
    }

    /// Attach the puzzle this result belongs to.
    pub fn with_puzzle(mut self, name: &str, empty_cells: usize) -> Self {
        self.name = Some(name.to_string());
        self.empty_cells = Some(empty_cells);
        self
    }

    /// Fitness as text, `unknown` when missing.
    pub fn fitness_label(&self) -> String {
        match self.fitness {
            Some(f) => f.to_string(),
            None => "unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_only_at_zero() {
        assert!(RunResult::known(0, Some(12), 1.0).success);
        assert!(!RunResult::known(1, None, 1.0).success);
        assert!(!RunResult::unknown(1.0, "no report").success);
    }

    #[test]
    fn test_json_field_names() {
        let result = RunResult::known(3, Some(40), 2.5);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["fitness"], 3);
        assert_eq!(value["tempo"], 2.5);
        assert_eq!(value["sucesso"], false);
        assert_eq!(value["geracao"], 40);
        assert!(value.get("nome").is_none());
        assert!(value.get("erro").is_none());
    }

    #[test]
    fn test_unknown_serializes_null() {
        let result = RunResult::unknown(0.5, "solver timed out").with_puzzle("Hard1", 58);
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["fitness"].is_null());
        assert_eq!(value["nome"], "Hard1");
        assert_eq!(value["celulas_vazias"], 58);
        assert_eq!(value["erro"], "solver timed out");
        assert_eq!(result.fitness_label(), "unknown");
    }
}
