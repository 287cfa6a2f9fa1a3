//! Puzzle grids and the built-in puzzle catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ConfigError, SolverConfig};

/// Grid side length.
pub const GRID_SIZE: usize = 9;

/// Total cells in a grid.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// A 9x9 Sudoku grid. `0` marks an empty cell, `1..=9` a fixed clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct PuzzleGrid {
    cells: [[u8; GRID_SIZE]; GRID_SIZE],
}

impl PuzzleGrid {
    /// Build a grid, checking every cell is in `0..=9`.
    pub fn new(cells: [[u8; GRID_SIZE]; GRID_SIZE]) -> Result<Self, ConfigError> {
        for (row, values) in cells.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value > 9 {
                    return Err(ConfigError::InvalidCellValue { row, col, value });
                }
            }
        }
        Ok(Self { cells })
    }

    /// Rows in row-major order.
    pub fn rows(&self) -> &[[u8; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    /// All 81 values, row-major.
    pub fn flat(&self) -> impl Iterator<Item = u8> + '_ {
        self.cells.iter().flat_map(|row| row.iter().copied())
    }

    /// `(row, col)` of every empty cell in row-major scan order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for (row, values) in self.cells.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value == 0 {
                    cells.push((row, col));
                }
            }
        }
        cells
    }

    /// Flat `row * 9 + col` indices of every empty cell, same order.
    pub fn empty_indices(&self) -> Vec<usize> {
        self.flat()
            .enumerate()
            .filter(|&(_, value)| value == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of empty cells.
    pub fn empty_count(&self) -> usize {
        self.flat().filter(|&v| v == 0).count()
    }
}

impl TryFrom<Vec<Vec<u8>>> for PuzzleGrid {
    type Error = ConfigError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        if rows.len() != GRID_SIZE {
            return Err(ConfigError::InvalidGridShape(format!("{} rows", rows.len())));
        }
        let mut cells = [[0u8; GRID_SIZE]; GRID_SIZE];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != GRID_SIZE {
                return Err(ConfigError::InvalidGridShape(format!(
                    "row {} has {} cells",
                    i,
                    row.len()
                )));
            }
            cells[i].copy_from_slice(row);
        }
        Self::new(cells)
    }
}

impl From<PuzzleGrid> for Vec<Vec<u8>> {
    fn from(grid: PuzzleGrid) -> Self {
        grid.cells.iter().map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for PuzzleGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 && r % 3 == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for (c, &value) in row.iter().enumerate() {
                if c > 0 && c % 3 == 0 {
                    write!(f, "| ")?;
                }
                if value == 0 {
                    write!(f, ". ")?;
                } else {
                    write!(f, "{} ", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A named catalog puzzle.
#[derive(Debug, Clone, Copy)]
pub struct NamedPuzzle {
    pub name: &'static str,
    pub grid: PuzzleGrid,
}

macro_rules! puzzle {
    ($name:expr, $cells:expr) => {
        NamedPuzzle {
            name: $name,
            grid: PuzzleGrid { cells: $cells },
        }
    };
}

/// Calibration grid from the reference study (its Appendix A).
pub static REFERENCE: NamedPuzzle = puzzle!(
    "Reference",
    [
        [0, 8, 4, 0, 7, 2, 1, 0, 5],
        [2, 0, 7, 8, 3, 0, 9, 0, 0],
        [6, 0, 0, 5, 0, 9, 0, 0, 8],
        [0, 6, 0, 9, 2, 8, 4, 0, 0],
        [0, 7, 0, 0, 0, 0, 0, 6, 9],
        [0, 2, 0, 0, 0, 0, 0, 8, 1],
        [0, 3, 2, 0, 5, 0, 6, 9, 4],
        [7, 0, 0, 0, 0, 0, 0, 0, 2],
        [1, 0, 0, 2, 0, 4, 0, 0, 7],
    ]
);

pub static EASY: [NamedPuzzle; 3] = [
    puzzle!(
        "Easy1",
        [
            [0, 3, 0, 0, 6, 8, 1, 7, 0],
            [0, 0, 0, 1, 0, 0, 0, 0, 3],
            [0, 1, 0, 7, 3, 2, 9, 0, 0],
            [0, 8, 0, 0, 1, 4, 0, 5, 0],
            [6, 4, 0, 0, 0, 0, 0, 9, 1],
            [0, 5, 0, 9, 8, 0, 0, 2, 0],
            [0, 0, 2, 3, 9, 7, 0, 1, 0],
            [4, 0, 0, 0, 0, 6, 0, 0, 0],
            [0, 7, 8, 4, 5, 0, 0, 6, 0],
        ]
    ),
    puzzle!(
        "Easy2",
        [
            [0, 0, 3, 0, 2, 0, 6, 0, 0],
            [9, 0, 0, 3, 0, 5, 0, 0, 1],
            [0, 0, 1, 8, 0, 6, 4, 0, 0],
            [0, 0, 8, 1, 0, 2, 9, 0, 0],
            [7, 0, 0, 0, 0, 0, 0, 0, 8],
            [0, 0, 6, 7, 0, 8, 2, 0, 0],
            [0, 0, 2, 6, 0, 9, 5, 0, 0],
            [8, 0, 0, 2, 0, 3, 0, 0, 9],
            [0, 0, 5, 0, 1, 0, 3, 0, 0],
        ]
    ),
    puzzle!(
        "Easy3",
        [
            [8, 0, 2, 0, 5, 0, 7, 0, 1],
            [0, 0, 7, 0, 8, 2, 4, 6, 0],
            [0, 1, 0, 9, 0, 0, 0, 0, 0],
            [6, 0, 0, 0, 0, 1, 8, 3, 2],
            [5, 0, 0, 0, 0, 0, 0, 0, 9],
            [1, 8, 4, 3, 0, 0, 0, 0, 6],
            [0, 0, 0, 0, 0, 4, 0, 2, 0],
            [0, 9, 5, 6, 1, 0, 3, 0, 0],
            [3, 0, 8, 0, 9, 0, 6, 0, 7],
        ]
    ),
];

pub static MEDIUM: [NamedPuzzle; 3] = [
    puzzle!(
        "Medium1",
        [
            [0, 0, 0, 0, 0, 0, 0, 8, 5],
            [0, 0, 0, 2, 1, 0, 0, 0, 9],
            [9, 6, 0, 0, 8, 0, 1, 0, 0],
            [5, 0, 0, 8, 0, 0, 0, 1, 6],
            [0, 0, 0, 0, 0, 0, 0, 0, 0],
            [8, 9, 0, 0, 0, 6, 0, 0, 7],
            [0, 0, 9, 0, 7, 0, 0, 5, 2],
            [3, 0, 0, 0, 5, 4, 0, 0, 0],
            [4, 8, 0, 0, 0, 0, 0, 0, 0],
        ]
    ),
    puzzle!(
        "Medium2",
        [
            [0, 0, 0, 0, 0, 0, 0, 0, 0],
            [0, 7, 9, 0, 5, 0, 1, 8, 0],
            [8, 0, 0, 0, 0, 0, 0, 0, 7],
            [0, 0, 7, 3, 0, 6, 8, 0, 0],
            [4, 5, 0, 7, 0, 8, 0, 9, 6],
            [0, 0, 3, 5, 0, 2, 7, 0, 0],
            [7, 0, 0, 0, 0, 0, 0, 0, 5],
            [0, 1, 6, 0, 3, 0, 4, 2, 0],
            [0, 0, 0, 0, 0, 0, 0, 0, 0],
        ]
    ),
    puzzle!(
        "Medium3",
        [
            [3, 8, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 4, 0, 0, 7, 8, 5],
            [0, 0, 9, 0, 2, 0, 3, 0, 0],
            [0, 6, 0, 0, 9, 0, 0, 0, 0],
            [8, 0, 0, 3, 0, 2, 0, 0, 9],
            [0, 0, 0, 0, 4, 0, 0, 7, 0],
            [0, 0, 1, 0, 7, 0, 5, 0, 0],
            [4, 9, 5, 0, 0, 6, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 9, 2],
        ]
    ),
];

pub static HARD: [NamedPuzzle; 3] = [
    puzzle!(
        "Hard1",
        [
            [0, 0, 0, 0, 0, 0, 3, 0, 0],
            [0, 2, 0, 6, 0, 0, 0, 0, 0],
            [9, 1, 3, 0, 0, 2, 0, 6, 0],
            [0, 0, 0, 3, 0, 7, 9, 0, 0],
            [0, 3, 0, 0, 8, 0, 5, 0, 0],
            [0, 0, 8, 0, 0, 0, 0, 0, 2],
            [3, 0, 0, 0, 5, 6, 0, 0, 0],
            [0, 0, 0, 2, 0, 0, 6, 7, 0],
            [5, 0, 2, 8, 0, 0, 0, 0, 0],
        ]
    ),
    puzzle!(
        "Hard2",
        [
            [0, 0, 0, 0, 0, 3, 0, 1, 7],
            [0, 1, 5, 0, 0, 9, 0, 0, 8],
            [0, 6, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 7, 0, 0, 0],
            [0, 0, 9, 0, 0, 0, 2, 0, 0],
            [0, 0, 0, 5, 0, 0, 0, 0, 4],
            [0, 0, 0, 0, 0, 0, 0, 2, 0],
            [5, 0, 0, 6, 0, 0, 3, 4, 0],
            [3, 4, 0, 2, 0, 0, 0, 0, 0],
        ]
    ),
    puzzle!(
        "Hard3",
        [
            [0, 0, 0, 7, 0, 0, 8, 0, 0],
            [0, 0, 6, 0, 0, 0, 0, 3, 1],
            [0, 4, 0, 0, 0, 2, 0, 0, 0],
            [0, 2, 4, 0, 7, 0, 0, 0, 0],
            [0, 1, 0, 0, 3, 0, 0, 8, 0],
            [0, 0, 0, 0, 6, 0, 2, 9, 0],
            [0, 0, 0, 8, 0, 0, 0, 7, 0],
            [8, 6, 0, 0, 0, 0, 5, 0, 0],
            [0, 0, 2, 0, 0, 6, 0, 0, 0],
        ]
    ),
];

/// Every catalog puzzle.
pub fn catalog() -> impl Iterator<Item = &'static NamedPuzzle> {
    std::iter::once(&REFERENCE)
        .chain(EASY.iter())
        .chain(MEDIUM.iter())
        .chain(HARD.iter())
}

/// Look up a catalog puzzle by name (case-insensitive).
pub fn find_puzzle(name: &str) -> Result<NamedPuzzle, ConfigError> {
    catalog()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .copied()
        .ok_or_else(|| ConfigError::UnknownPuzzle(name.to_string()))
}

/// Difficulty preset: a set of puzzles sharing one parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitePreset {
    Easy,
    Medium,
    Hard,
}

impl SuitePreset {
    /// Puzzles run by this preset, in order.
    pub fn puzzles(self) -> Vec<NamedPuzzle> {
        match self {
            SuitePreset::Easy => EASY.iter().copied().chain([REFERENCE]).collect(),
            SuitePreset::Medium => MEDIUM.to_vec(),
            SuitePreset::Hard => HARD.to_vec(),
        }
    }

    /// Solver parameters tuned for this difficulty.
    pub fn params(self) -> SolverConfig {
        let (population, generations, mutation_rate) = match self {
            SuitePreset::Easy => (800, 400, 15.0),
            SuitePreset::Medium => (600, 300, 10.0),
            SuitePreset::Hard => (1000, 500, 20.0),
        };
        SolverConfig {
            population,
            generations,
            mutation_rate,
            ..SolverConfig::default()
        }
    }

    /// Default JSON summary path for this preset.
    pub fn output_path(self) -> &'static str {
        match self {
            SuitePreset::Easy => "resultados_faceis.json",
            SuitePreset::Medium => "resultados_medios.json",
            SuitePreset::Hard => "resultados_dificeis.json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_grids_valid() {
        for puzzle in catalog() {
            assert!(PuzzleGrid::new(*puzzle.grid.rows()).is_ok(), "{}", puzzle.name);
            assert!(puzzle.grid.empty_count() > 0);
        }
        assert_eq!(catalog().count(), 10);
    }

    #[test]
    fn test_empty_cells_row_major() {
        let grid = REFERENCE.grid;
        let cells = grid.empty_cells();
        let indices = grid.empty_indices();

        assert_eq!(cells.len(), grid.empty_count());
        assert_eq!(indices.len(), cells.len());
        assert_eq!(cells[0], (0, 0));
        assert_eq!(cells[1], (0, 3));
        for (&(r, c), &i) in cells.iter().zip(&indices) {
            assert_eq!(r * GRID_SIZE + c, i);
            assert_eq!(grid.get(r, c), 0);
        }
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_try_from_rejects_bad_shape() {
        let rows = vec![vec![0u8; 9]; 8];
        assert!(matches!(
            PuzzleGrid::try_from(rows),
            Err(ConfigError::InvalidGridShape(_))
        ));

        let mut rows = vec![vec![0u8; 9]; 9];
        rows[4].push(1);
        assert!(matches!(
            PuzzleGrid::try_from(rows),
            Err(ConfigError::InvalidGridShape(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_value() {
        let mut rows = vec![vec![0u8; 9]; 9];
        rows[2][5] = 10;
        assert_eq!(
            PuzzleGrid::try_from(rows),
            Err(ConfigError::InvalidCellValue {
                row: 2,
                col: 5,
                value: 10
            })
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let json = serde_json::to_string(&HARD[1].grid).unwrap();
        let parsed: PuzzleGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, HARD[1].grid);
    }

    #[test]
    fn test_find_puzzle() {
        assert_eq!(find_puzzle("hard2").unwrap().name, "Hard2");
        assert!(matches!(
            find_puzzle("Impossible"),
            Err(ConfigError::UnknownPuzzle(_))
        ));
    }

    #[test]
    fn test_presets() {
        let easy = SuitePreset::Easy.puzzles();
        assert_eq!(easy.len(), 4);
        assert_eq!(easy[3].name, "Reference");
        assert_eq!(SuitePreset::Hard.params().population, 1000);
        assert_eq!(SuitePreset::Hard.params().generations, 500);
        assert_eq!(SuitePreset::Medium.params().mutation_rate, 10.0);
        for preset in [SuitePreset::Easy, SuitePreset::Medium, SuitePreset::Hard] {
            assert!(preset.params().validate().is_ok());
        }
    }

    #[test]
    fn test_display_marks_empty() {
        let text = REFERENCE.grid.to_string();
        assert_eq!(text.lines().count(), 11);
        assert!(text.starts_with(". 8 4 | . 7 2 | 1 . 5"));
    }
}
