//! Fixed-size parameter header at the start of the problem artifact.

use std::io::{self, Read, Write};

use crate::schema::SolverConfig;

/// Solver parameter header.
///
/// All fields are big-endian; the mutation rate is an IEEE-754 single.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProblemHeader {
    pub population: u32,
    pub generations: u32,
    pub mutation_rate: f32,
    pub elitism: u32,
    pub tournament_size: u32,
}

impl ProblemHeader {
    /// Size of header in bytes.
    /// Population(4) + Generations(4) + Mutation(4) + Elitism(4) + Tournament(4) = 20
    pub const SIZE: usize = 20;

    /// Write header to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.population.to_be_bytes())?;
        w.write_all(&self.generations.to_be_bytes())?;
        w.write_all(&self.mutation_rate.to_be_bytes())?;
        w.write_all(&self.elitism.to_be_bytes())?;
        w.write_all(&self.tournament_size.to_be_bytes())?;
        Ok(())
    }

    /// Read header from input.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf4 = [0u8; 4];

        r.read_exact(&mut buf4)?;
        let population = u32::from_be_bytes(buf4);

        r.read_exact(&mut buf4)?;
        let generations = u32::from_be_bytes(buf4);

        r.read_exact(&mut buf4)?;
        let mutation_rate = f32::from_be_bytes(buf4);

        r.read_exact(&mut buf4)?;
        let elitism = u32::from_be_bytes(buf4);

        r.read_exact(&mut buf4)?;
        let tournament_size = u32::from_be_bytes(buf4);

        Ok(Self {
            population,
            generations,
            mutation_rate,
            elitism,
            tournament_size,
        })
    }
}

impl From<&SolverConfig> for ProblemHeader {
    fn from(config: &SolverConfig) -> Self {
        Self {
            population: config.population,
            generations: config.generations,
            mutation_rate: config.mutation_rate,
            elitism: config.elitism,
            tournament_size: config.tournament_size,
        }
    }
}

impl From<ProblemHeader> for SolverConfig {
    fn from(header: ProblemHeader) -> Self {
        Self {
            population: header.population,
            generations: header.generations,
            mutation_rate: header.mutation_rate,
            elitism: header.elitism,
            tournament_size: header.tournament_size,
        }
    }
}
