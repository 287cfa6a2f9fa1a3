//! Sudoku GA benchmark CLI - Run the external solver and report statistics.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use sudoku_bench::{
    encoding::{read_artifact, write_artifact},
    runner::{BatchRunner, ComparisonReport, ProcessSolver, SuiteSummary, TrialEvent},
    schema::{BenchConfig, ExtractionSource, SolverConfig, SuitePreset, find_puzzle},
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "sudoku-bench")]
#[command(version)]
#[command(about = "Benchmark an external Sudoku genetic algorithm against a baseline")]
struct Cli {
    /// JSON configuration file (see `example-config`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Solver executable
    #[arg(long, global = true)]
    solver: Option<String>,

    /// Solver argument (repeatable)
    #[arg(long = "solver-arg", global = true, allow_hyphen_values = true)]
    solver_args: Vec<String>,

    /// Working directory for the solver
    #[arg(long, global = true)]
    workdir: Option<PathBuf>,

    /// Kill the solver after this many seconds
    #[arg(long, global = true)]
    timeout: Option<f64>,

    /// Problem artifact path
    #[arg(long, global = true)]
    artifact: Option<PathBuf>,

    /// Solver report file path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// JSON summary path
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Repeat one puzzle and compare against the baseline
    Compare {
        /// Catalog puzzle
        #[arg(long, default_value = "Reference")]
        puzzle: String,

        /// Number of trials
        #[arg(long)]
        trials: Option<usize>,

        /// Where to read fitness from
        #[arg(long, value_enum)]
        extraction: Option<Extraction>,

        #[command(flatten)]
        params: ParamArgs,
    },
    /// Run every puzzle of a difficulty preset once
    Suite {
        #[arg(value_enum)]
        preset: Preset,

        /// Where to read fitness from
        #[arg(long, value_enum, default_value = "stdout")]
        extraction: Extraction,

        #[command(flatten)]
        params: ParamArgs,
    },
    /// Write the problem artifact without running the solver
    Encode {
        /// Catalog puzzle
        #[arg(long, default_value = "Reference")]
        puzzle: String,

        #[command(flatten)]
        params: ParamArgs,
    },
    /// Decode and print a problem artifact
    Inspect {
        /// Artifact to read (defaults to the configured artifact path)
        path: Option<PathBuf>,
    },
    /// Print the default configuration as JSON
    ExampleConfig,
}

/// Solver parameter overrides.
#[derive(Args)]
struct ParamArgs {
    /// Population size
    #[arg(long)]
    population: Option<u32>,

    /// Generations
    #[arg(long)]
    generations: Option<u32>,

    /// Mutation rate in percent
    #[arg(long)]
    mutation: Option<f32>,

    /// Elitism count
    #[arg(long)]
    elitism: Option<u32>,

    /// Tournament size
    #[arg(long)]
    tournament: Option<u32>,
}

impl ParamArgs {
    fn apply(&self, base: SolverConfig) -> SolverConfig {
        SolverConfig {
            population: self.population.unwrap_or(base.population),
            generations: self.generations.unwrap_or(base.generations),
            mutation_rate: self.mutation.unwrap_or(base.mutation_rate),
            elitism: self.elitism.unwrap_or(base.elitism),
            tournament_size: self.tournament.unwrap_or(base.tournament_size),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Extraction {
    ReportFile,
    Stdout,
}

impl From<Extraction> for ExtractionSource {
    fn from(e: Extraction) -> Self {
        match e {
            Extraction::ReportFile => ExtractionSource::ReportFile,
            Extraction::Stdout => ExtractionSource::Stdout,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Easy,
    Medium,
    Hard,
}

impl From<Preset> for SuitePreset {
    fn from(p: Preset) -> Self {
        match p {
            Preset::Easy => SuitePreset::Easy,
            Preset::Medium => SuitePreset::Medium,
            Preset::Hard => SuitePreset::Hard,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Compare {
            puzzle,
            trials,
            extraction,
            params,
        } => {
            let mut config = config;
            if let Some(trials) = trials {
                config.trials = *trials;
            }
            if let Some(extraction) = extraction {
                config.extraction = (*extraction).into();
            }
            config.params = params.apply(config.params);
            compare(&config, puzzle)
        }
        Commands::Suite {
            preset,
            extraction,
            params,
        } => {
            let preset = SuitePreset::from(*preset);
            let mut config = config;
            config.extraction = (*extraction).into();
            if cli.output.is_none() {
                config.output_path = PathBuf::from(preset.output_path());
            }
            let params = params.apply(preset.params());
            suite(&config, preset, &params)
        }
        Commands::Encode { puzzle, params } => {
            let puzzle = find_puzzle(puzzle)?;
            let params = params.apply(config.params);
            params.validate()?;
            let bytes = write_artifact(&config.artifact_path, &puzzle.grid, &params)?;
            println!(
                "Wrote {} ({} bytes, {} empty cells)",
                config.artifact_path.display(),
                bytes,
                puzzle.grid.empty_count()
            );
            Ok(())
        }
        Commands::Inspect { path } => {
            inspect(path.as_deref().unwrap_or(&config.artifact_path))
        }
        Commands::ExampleConfig => {
            println!("{}", serde_json::to_string_pretty(&BenchConfig::default())?);
            Ok(())
        }
    }
}

/// Configuration file (or defaults) with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<BenchConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Error reading config file {}: {}", path.display(), e))?;
            serde_json::from_str::<BenchConfig>(&text)
                .map_err(|e| format!("Error parsing config {}: {}", path.display(), e))?
        }
        None => BenchConfig::default(),
    };

    if let Some(program) = &cli.solver {
        config.solver.program = program.clone();
        config.solver.args = cli.solver_args.clone();
    } else if !cli.solver_args.is_empty() {
        config.solver.args = cli.solver_args.clone();
    }
    if let Some(dir) = &cli.workdir {
        config.solver.working_dir = Some(dir.clone());
    }
    if let Some(secs) = cli.timeout {
        config.solver.timeout_secs = Some(secs);
    }
    if let Some(path) = &cli.artifact {
        config.artifact_path = path.clone();
    }
    if let Some(path) = &cli.report {
        config.report_path = path.clone();
    }
    if let Some(path) = &cli.output {
        config.output_path = path.clone();
    }

    config.validate()?;
    Ok(config)
}

fn compare(config: &BenchConfig, puzzle: &str) -> CliResult {
    let puzzle = find_puzzle(puzzle)?;
    let rule = "=".repeat(70);

    println!("{}", rule);
    println!("COMPARISON: {} vs {}", config.solver.display(), config.baseline.label);
    println!("{}", rule);
    println!(
        "Puzzle: {} ({} empty cells)",
        puzzle.name,
        puzzle.grid.empty_count()
    );
    println!("Running {} trials...", config.trials);
    println!();

    let solver = ProcessSolver::new(config.solver.clone());
    let mut runner = BatchRunner::new(solver, config);
    let report = runner.run_comparison(
        &puzzle.grid,
        &config.params,
        config.trials,
        |event| match event {
            TrialEvent::Started { index, total, .. } => {
                print!("Trial {}/{}... ", index + 1, total);
                let _ = io::stdout().flush();
            }
            TrialEvent::Finished { result, .. } => {
                let status = match (result.success, &result.error) {
                    (true, _) => "OPTIMAL!".to_string(),
                    (false, Some(err)) if result.fitness.is_none() => {
                        format!("fitness=unknown [{}]", err)
                    }
                    _ => format!("fitness={}", result.fitness_label()),
                };
                println!("{} ({:.1}s)", status, result.elapsed_seconds);
            }
        },
    )?;

    println!();
    println!(
        "{}",
        ComparisonReport {
            statistics: &report.statistics,
            baseline: &config.baseline,
        }
    );
    println!();
    println!("Data saved to '{}'", runner.output_path().display());
    Ok(())
}

fn suite(config: &BenchConfig, preset: SuitePreset, params: &SolverConfig) -> CliResult {
    let rule = "=".repeat(60);
    let puzzles = preset.puzzles();

    println!("{}", rule);
    println!("SUITE: {:?} puzzles", preset);
    println!("Solver: {}", config.solver.display());
    println!("{}", rule);

    let solver = ProcessSolver::new(config.solver.clone());
    let mut runner = BatchRunner::new(solver, config);
    let report = runner.run_suite(&puzzles, params, |event| match event {
        TrialEvent::Started {
            name, grid, params, ..
        } => {
            println!();
            println!("{}", rule);
            println!("TESTING: {}", name.unwrap_or("-"));
            println!("Empty cells: {}", grid.empty_count());
            println!(
                "Parameters: pop={}, gen={}, mut={}%",
                params.population, params.generations, params.mutation_rate
            );
            println!("{}", rule);
            println!("{}", grid);
        }
        TrialEvent::Finished { result, .. } => {
            println!("Best fitness: {}", result.fitness_label());
            if let Some(generation) = result.generation {
                println!("Reached at generation: {}", generation);
            }
            println!("Elapsed: {:.2} seconds", result.elapsed_seconds);
            if result.success {
                println!("SOLUTION FOUND");
            } else {
                println!("No perfect solution");
            }
        }
    })?;

    println!();
    println!("{}", rule);
    println!("SUITE SUMMARY");
    println!("{}", rule);
    println!(
        "{}",
        SuiteSummary {
            results: &report.results,
            statistics: &report.statistics,
        }
    );
    info!("Summary written to {}", runner.output_path().display());
    Ok(())
}

fn inspect(path: &Path) -> CliResult {
    let problem = read_artifact(path)?;
    let params = problem.config();
    let grid = problem.puzzle()?;

    println!("Artifact: {}", path.display());
    println!("  Population: {}", params.population);
    println!("  Generations: {}", params.generations);
    println!("  Mutation rate: {}%", params.mutation_rate);
    println!("  Elitism: {}", params.elitism);
    println!("  Tournament size: {}", params.tournament_size);
    println!("  Digits: {:?}", problem.digits.data);
    println!("  Empty cells: {}", problem.empty_count());
    println!();
    println!("{}", grid);
    Ok(())
}
