//! Binary problem artifact read by the external solver.
//!
//! The artifact (`entrada.in` by default) is rewritten before every trial and
//! is the only channel through which the puzzle and hyperparameters reach the
//! solver.
//!
//! # File Format
//!
//! ```text
//! Header (20 bytes, big-endian):
//!   Population: u32
//!   Generations: u32
//!   Mutation rate: f32 (percent)
//!   Elitism: u32
//!   Tournament size: u32
//!
//! Four .npy v1.0 blocks (little-endian int64, C order):
//!   Valid digits      shape (9,)
//!   Grid              shape (9, 9)
//!   Empty cells       shape (k, 2)  (row, col) in row-major scan order
//!   Empty indices     shape (k,)    row * 9 + col, same order
//! ```
//!
//! Each block carries its own dtype and shape, so the solver can load them
//! with `numpy.load` one after another from the same file handle.

mod format;
mod npy;
mod problem;

pub use format::ProblemHeader;
pub use npy::{ArrayBlock, NPY_DESCR, NPY_MAGIC, NPY_VERSION};
pub use problem::{EncodeError, EncodedProblem, read_artifact, write_artifact};
