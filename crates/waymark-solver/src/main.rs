// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use clap::Parser;
use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};
use waymark_model::loading::{LoaderError, MatrixLoader};
use waymark_solver::{
    config::{ConfigError, HybridConfig},
    solver::HybridSolver,
};

/// Solves a travelling salesman instance given as a distance matrix.
#[derive(Debug, Parser)]
#[command(name = "waymark", version, about)]
struct Cli {
    /// Distance matrix file: one comma separated row per line.
    matrix: PathBuf,
    /// JSON configuration file; flags below override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Number of exact search workers.
    #[arg(long)]
    workers: Option<usize>,
    /// Base seed of every random generator.
    #[arg(long)]
    seed: Option<u64>,
    /// Wall clock budget of the exact portfolio.
    #[arg(long, value_name = "SECONDS", value_parser = parse_seconds)]
    time_limit: Option<Duration>,
    /// Stop the portfolio after this many exact solutions.
    #[arg(long)]
    solution_limit: Option<u64>,
    /// Generations per evolutionary pass.
    #[arg(long)]
    generations: Option<u64>,
    /// Run the exact portfolio alone.
    #[arg(long)]
    no_refiner: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not load the distance matrix: {0}")]
    Matrix(#[from] LoaderError),
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

fn enable_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<HybridConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => HybridConfig::from_path(path)?,
        None => HybridConfig::default(),
    };
    if let Some(workers) = cli.workers {
        config = config.with_portfolio_size(workers);
    }
    if cli.seed.is_some() {
        config = config.with_seed(cli.seed);
    }
    if cli.time_limit.is_some() {
        config = config.with_time_limit(cli.time_limit);
    }
    if cli.solution_limit.is_some() {
        config = config.with_solution_limit(cli.solution_limit);
    }
    if let Some(generations) = cli.generations {
        config = config.with_refiner_generations(generations);
    }
    if cli.no_refiner {
        config = config.with_refiner_enabled(false);
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let matrix = MatrixLoader::new().from_path::<i64, _>(&cli.matrix)?;
    tracing::info!(
        path = %cli.matrix.display(),
        num_cities = matrix.num_cities(),
        "distance matrix loaded"
    );

    let solver = HybridSolver::new(Arc::new(matrix), config)?;
    let outcome = solver.solve_with(|event| {
        println!(
            "{} ({}, {:.3}s)",
            event.distance,
            event.source,
            event.elapsed.as_secs_f64()
        );
    });

    println!("{}", outcome);
    if let Some(tour) = outcome.best_exact_tour() {
        println!("{}", tour);
    } else if let Some(tour) = outcome.refiner_tour() {
        println!("{}", tour);
    }
    Ok(())
}

fn main() -> ExitCode {
    enable_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
