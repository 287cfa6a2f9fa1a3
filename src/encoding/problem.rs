//! Complete problem artifact: parameter header plus four array blocks.

use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::format::ProblemHeader;
use super::npy::ArrayBlock;
use crate::schema::{GRID_SIZE, PuzzleGrid, SolverConfig};

/// Errors raised while writing or decoding the problem artifact.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Cannot write problem artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed problem artifact: {0}")]
    Malformed(String),
}

impl EncodeError {
    fn io(path: &Path, source: io::Error) -> Self {
        EncodeError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Byte-exact problem description consumed by the solver.
///
/// The empty-cell arrays are derivable from the grid but are embedded so
/// the solver does not have to recompute them.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedProblem {
    pub header: ProblemHeader,
    /// Valid digits `1..=9`.
    pub digits: ArrayBlock,
    /// The 9x9 grid.
    pub grid: ArrayBlock,
    /// `(row, col)` of each empty cell, shape `(k, 2)`.
    pub empty_cells: ArrayBlock,
    /// `row * 9 + col` of each empty cell, shape `(k,)`.
    pub empty_indices: ArrayBlock,
}

impl EncodedProblem {
    /// Build the artifact contents for a puzzle and parameter set.
    pub fn new(grid: &PuzzleGrid, config: &SolverConfig) -> Self {
        let cells = grid.empty_cells();
        let coords: Vec<i64> = cells
            .iter()
            .flat_map(|&(r, c)| [r as i64, c as i64])
            .collect();

        Self {
            header: ProblemHeader::from(config),
            digits: ArrayBlock::vector((1..=9).collect()),
            grid: ArrayBlock::matrix(GRID_SIZE, GRID_SIZE, grid.flat().map(i64::from).collect()),
            empty_cells: ArrayBlock::matrix(cells.len(), 2, coords),
            empty_indices: ArrayBlock::vector(
                grid.empty_indices().into_iter().map(|i| i as i64).collect(),
            ),
        }
    }

    /// Number of empty cells described.
    pub fn empty_count(&self) -> usize {
        self.empty_indices.data.len()
    }

    /// Total encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        ProblemHeader::SIZE
            + self.digits.encoded_len()
            + self.grid.encoded_len()
            + self.empty_cells.encoded_len()
            + self.empty_indices.encoded_len()
    }

    /// Write the artifact to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.header.write_to(w)?;
        self.digits.write_to(w)?;
        self.grid.write_to(w)?;
        self.empty_cells.write_to(w)?;
        self.empty_indices.write_to(w)?;
        Ok(())
    }

    /// Encode into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut buf)
            .map_err(|e| EncodeError::Malformed(e.to_string()))?;
        Ok(buf)
    }

    /// Decode an artifact, checking every block has the expected shape.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, EncodeError> {
        let malformed = |e: io::Error| EncodeError::Malformed(e.to_string());

        let header = ProblemHeader::read_from(r).map_err(malformed)?;
        let digits = ArrayBlock::read_from(r).map_err(malformed)?;
        let grid = ArrayBlock::read_from(r).map_err(malformed)?;
        let empty_cells = ArrayBlock::read_from(r).map_err(malformed)?;
        let empty_indices = ArrayBlock::read_from(r).map_err(malformed)?;

        if digits.shape != [9] {
            return Err(EncodeError::Malformed(format!(
                "digit block has shape {:?}",
                digits.shape
            )));
        }
        if grid.shape != [GRID_SIZE, GRID_SIZE] {
            return Err(EncodeError::Malformed(format!(
                "grid block has shape {:?}",
                grid.shape
            )));
        }
        let k = empty_indices.data.len();
        if empty_cells.shape != [k, 2] || empty_indices.shape != [k] {
            return Err(EncodeError::Malformed(format!(
                "empty-cell blocks disagree: {:?} vs {:?}",
                empty_cells.shape, empty_indices.shape
            )));
        }

        Ok(Self {
            header,
            digits,
            grid,
            empty_cells,
            empty_indices,
        })
    }

    /// Solver parameters carried in the header.
    pub fn config(&self) -> SolverConfig {
        SolverConfig::from(self.header)
    }

    /// Rebuild the puzzle grid from the grid block.
    pub fn puzzle(&self) -> Result<PuzzleGrid, EncodeError> {
        let mut cells = [[0u8; GRID_SIZE]; GRID_SIZE];
        for (i, &v) in self.grid.data.iter().enumerate() {
            cells[i / GRID_SIZE][i % GRID_SIZE] = u8::try_from(v)
                .map_err(|_| EncodeError::Malformed(format!("grid cell {} holds {}", i, v)))?;
        }
        PuzzleGrid::new(cells).map_err(|e| EncodeError::Malformed(e.to_string()))
    }
}

/// Encode a puzzle and write it to `path`, replacing any previous artifact.
///
/// Returns the number of bytes written.
pub fn write_artifact<P: AsRef<Path>>(
    path: P,
    grid: &PuzzleGrid,
    config: &SolverConfig,
) -> Result<usize, EncodeError> {
    let path = path.as_ref();
    let problem = EncodedProblem::new(grid, config);

    let file = File::create(path).map_err(|e| EncodeError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    problem
        .write_to(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| EncodeError::io(path, e))?;

    let len = problem.encoded_len();
    debug!(
        "Wrote {} ({} bytes, {} empty cells)",
        path.display(),
        len,
        problem.empty_count()
    );
    Ok(len)
}

/// Read and decode an artifact from disk.
pub fn read_artifact<P: AsRef<Path>>(path: P) -> Result<EncodedProblem, EncodeError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| EncodeError::io(path, e))?;
    let mut cursor = Cursor::new(&bytes);
    let problem = EncodedProblem::read_from(&mut cursor)?;
    if (cursor.position() as usize) != bytes.len() {
        return Err(EncodeError::Malformed(format!(
            "{} trailing bytes",
            bytes.len() - cursor.position() as usize
        )));
    }
    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HARD, REFERENCE};
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn grid_with_zeros(zeros: usize) -> PuzzleGrid {
        let mut cells = [[0u8; GRID_SIZE]; GRID_SIZE];
        for i in zeros..81 {
            cells[i / 9][i % 9] = (i % 9) as u8 + 1;
        }
        PuzzleGrid::new(cells).unwrap()
    }

    #[test]
    fn test_scenario_header_bytes() {
        let grid = grid_with_zeros(30);
        let config = SolverConfig {
            population: 600,
            generations: 300,
            mutation_rate: 5.0,
            elitism: 5,
            tournament_size: 3,
        };

        let bytes = EncodedProblem::new(&grid, &config).to_bytes().unwrap();
        assert_eq!(
            &bytes[..ProblemHeader::SIZE],
            &[
                0x00, 0x00, 0x02, 0x58, 0x00, 0x00, 0x01, 0x2C, 0x40, 0xA0, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x05, 0x00, 0x00, 0x00, 0x03,
            ]
        );

        let decoded = EncodedProblem::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded.empty_cells.shape, vec![30, 2]);
        assert_eq!(decoded.empty_indices.shape, vec![30]);
    }

    #[test]
    fn test_block_contents() {
        let problem = EncodedProblem::new(&REFERENCE.grid, &SolverConfig::default());

        assert_eq!(problem.digits.data, (1..=9).collect::<Vec<i64>>());
        assert_eq!(problem.grid.data[..9], [0, 8, 4, 0, 7, 2, 1, 0, 5]);
        assert_eq!(problem.empty_cells.data[..4], [0, 0, 0, 3]);
        assert_eq!(problem.empty_indices.data[..3], [0, 3, 7]);
        assert_eq!(problem.empty_count(), REFERENCE.grid.empty_count());
    }

    #[test]
    fn test_write_is_idempotent() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.in");
        let b = dir.path().join("b.in");

        let config = SolverConfig::default();
        write_artifact(&a, &HARD[0].grid, &config).unwrap();
        write_artifact(&b, &HARD[0].grid, &config).unwrap();
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn test_write_overwrites_previous() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entrada.in");
        fs::write(&path, vec![0xFFu8; 10_000]).unwrap();

        let written = write_artifact(&path, &REFERENCE.grid, &SolverConfig::default()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len() as usize, written);

        let problem = read_artifact(&path).unwrap();
        assert_eq!(problem.puzzle().unwrap(), REFERENCE.grid);
        assert_eq!(problem.config(), SolverConfig::default());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("entrada.in");
        let err = write_artifact(&path, &REFERENCE.grid, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, EncodeError::Io { .. }));
    }

    #[test]
    fn test_truncated_artifact_is_malformed() {
        let bytes = EncodedProblem::new(&REFERENCE.grid, &SolverConfig::default())
            .to_bytes()
            .unwrap();
        let truncated = &bytes[..bytes.len() - 4];
        let err = EncodedProblem::read_from(&mut Cursor::new(truncated)).unwrap_err();
        assert!(matches!(err, EncodeError::Malformed(_)));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entrada.in");
        let mut bytes = EncodedProblem::new(&REFERENCE.grid, &SolverConfig::default())
            .to_bytes()
            .unwrap();
        bytes.push(0);
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            read_artifact(&path),
            Err(EncodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_oversized_block_shape_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entrada.in");

        let mut bytes = Vec::new();
        ProblemHeader::from(&SolverConfig::default())
            .write_to(&mut bytes)
            .unwrap();
        let header =
            "{'descr': '<i8', 'fortran_order': False, 'shape': (18446744073709551615,), }\n";
        bytes.extend_from_slice(b"\x93NUMPY\x01\x00");
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[0u8; 16]);
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            read_artifact(&path),
            Err(EncodeError::Malformed(_))
        ));
    }

    proptest! {
        #[test]
        fn empty_blocks_match_zero_count(cells in proptest::collection::vec(0u8..=9, 81)) {
            let mut rows = [[0u8; GRID_SIZE]; GRID_SIZE];
            for (i, v) in cells.iter().enumerate() {
                rows[i / 9][i % 9] = *v;
            }
            let grid = PuzzleGrid::new(rows).unwrap();
            let zeros = cells.iter().filter(|&&v| v == 0).count();

            let problem = EncodedProblem::new(&grid, &SolverConfig::default());
            prop_assert_eq!(problem.empty_cells.shape.clone(), vec![zeros, 2]);
            prop_assert_eq!(problem.empty_indices.data.len(), zeros);

            let bytes = problem.to_bytes().unwrap();
            prop_assert_eq!(bytes.len(), problem.encoded_len());
            let decoded = EncodedProblem::read_from(&mut Cursor::new(&bytes)).unwrap();
            prop_assert_eq!(decoded, problem);
        }
    }
}
