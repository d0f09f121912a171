//! Test harness for the parallel Gaussian elimination solver
//!
//! Solves an optional matrix file, then a series of random systems for each
//! requested size, printing timing and verification results.
//!
//! Usage:
//!     cargo run --release --bin run-gauss -- --input 256.txt --sizes 64,256 --trials 10

use anyhow::{Context, bail};
use clap::Parser;
use math_audio_gauss::{
    AugmentedMatrix, Coordinator, GaussConfig, HarnessConfig, NullReporter, Reporter, SolveReport,
    eliminate_serial_timed, format_matrix, random_matrix, read_matrix,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "run-gauss",
    about = "Solve dense linear systems with parallel Gaussian elimination"
)]
struct Cli {
    /// Matrix file in the text format (first line n, then n rows of n+1 numbers)
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON harness configuration; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated sizes of random matrices to solve
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Number of random trials per size
    #[arg(long)]
    trials: Option<usize>,

    /// Random entries are integers drawn from [0, value-range)
    #[arg(long)]
    value_range: Option<u32>,

    /// Seed for reproducible random matrices
    #[arg(long)]
    seed: Option<u64>,

    /// Number of workers per elimination step (0 = use all available cores)
    #[arg(long)]
    workers: Option<usize>,

    /// Absolute tolerance when verifying solutions
    #[arg(long)]
    tolerance: Option<f64>,

    /// Print matrices and solutions, including every intermediate step
    #[arg(long)]
    verbose: bool,

    /// Skip the random trials
    #[arg(long)]
    no_random: bool,

    /// Also run the single-threaded reference and compare triangular forms
    #[arg(long)]
    serial_check: bool,
}

impl Cli {
    fn harness_config(&self) -> anyhow::Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => HarnessConfig::default(),
        };
        if let Some(input) = &self.input {
            config.input = Some(input.clone());
        }
        if let Some(sizes) = &self.sizes {
            config.random_sizes = sizes.clone();
        }
        if self.no_random {
            config.random_sizes.clear();
        }
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(range) = self.value_range {
            config.value_range = range;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        match self.workers {
            Some(0) => config.solver.workers = None,
            Some(n) => config.solver.workers = Some(n),
            None => {}
        }
        if self.verbose {
            config.solver.verbose = true;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Prints matrices and solutions to stdout
struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn on_step(&mut self, k: usize, matrix: &AugmentedMatrix) {
        println!("After step {}:\n{}", k, format_matrix(matrix));
    }

    fn on_solved(&mut self, report: &SolveReport) {
        println!("Triangular matrix:\n\n{}", format_matrix(&report.triangular));
        println!("Solutions:");
        for x in report.solution.iter() {
            println!("{}", x);
        }
    }
}

fn run_one(
    coordinator: &Coordinator,
    matrix: AugmentedMatrix,
    config: &HarnessConfig,
    serial_check: bool,
    reporter: &mut dyn Reporter,
) -> anyhow::Result<bool> {
    let reference = if serial_check {
        Some(eliminate_serial_timed(&matrix)?)
    } else {
        None
    };

    let report = coordinator.solve(matrix, reporter)?;
    let valid = report.is_valid(config.tolerance);
    let serial_timing = reference
        .as_ref()
        .map(|(_, elapsed)| format!(" (serial {:.3}ms)", elapsed.as_secs_f64() * 1000.0))
        .unwrap_or_default();
    println!(
        "n={} workers={} {:.3}ms{} passed, max residual {:.3e}{}",
        report.n(),
        report.workers,
        report.elapsed_ms(),
        serial_timing,
        report.max_residual(),
        if valid { ", solution is correct" } else { "" }
    );

    if reference.is_some_and(|(r, _)| r != report.triangular) {
        bail!("parallel and serial triangular forms differ for n={}", report.n());
    }
    Ok(valid)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.harness_config()?;
    let coordinator = Coordinator::new(&config.solver)?;
    log::info!("using {} workers", coordinator.workers());

    let mut failures = 0usize;

    if let Some(path) = &config.input {
        let matrix =
            read_matrix(path).with_context(|| format!("reading {}", path.display()))?;
        if config.solver.verbose {
            println!("{}", format_matrix(&matrix));
        }
        let mut reporter: Box<dyn Reporter> = if config.solver.verbose {
            Box::new(StdoutReporter)
        } else {
            Box::new(NullReporter)
        };
        if !run_one(&coordinator, matrix, &config, cli.serial_check, reporter.as_mut())? {
            failures += 1;
        }
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            let mut thread_rng = rand::rng();
            StdRng::from_rng(&mut thread_rng)
        }
    };

    // Random trials never print intermediate matrices.
    let trial_coordinator = if config.solver.verbose {
        Coordinator::new(&GaussConfig {
            verbose: false,
            ..config.solver.clone()
        })?
    } else {
        coordinator
    };

    for &n in &config.random_sizes {
        println!(
            "Testing parallel algorithm {} times for random size {} matrix:",
            config.trials, n
        );
        for _ in 0..config.trials {
            let matrix = random_matrix(n, config.value_range, &mut rng)?;
            match run_one(
                &trial_coordinator,
                matrix,
                &config,
                cli.serial_check,
                &mut NullReporter,
            ) {
                Ok(true) => {}
                Ok(false) => failures += 1,
                Err(e) => {
                    // Random integer matrices are occasionally singular.
                    println!("trial failed: {}", e);
                    failures += 1;
                }
            }
        }
    }

    if failures > 0 {
        bail!("{} solve(s) did not verify", failures);
    }
    Ok(())
}
