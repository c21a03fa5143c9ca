//! Headless Smokestack scenario runner.
//!
//! Runs the simulation without graphics and prints a JSON summary.
//! Designed for CI verification and balance experiments.
//!
//! # Usage
//!
//! ```bash
//! # Run the built-in demo scenario
//! cargo run -p smokestack_headless -- run
//!
//! # Run a scenario file
//! cargo run -p smokestack_headless -- run --scenario scenarios/boomtown.ron
//!
//! # Shorten a run and pretty-print the summary
//! cargo run -p smokestack_headless -- run --frames 600 --pretty
//! ```
//!
//! Output (stdout): one JSON summary object.
//! Logs (stderr): controlled by `--verbose` / `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smokestack_headless::{runner, scenario::Scenario};

#[derive(Parser)]
#[command(name = "smokestack_headless")]
#[command(about = "Headless settlement-simulation runner for CI and balance testing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single scenario
    Run {
        /// Scenario file to load (built-in demo when omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Override the scenario's frame count
        #[arg(long)]
        frames: Option<u64>,

        /// Pretty-print the JSON summary
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            frames,
            pretty,
        } => {
            let mut scenario = match scenario {
                Some(path) => match Scenario::load(&path) {
                    Ok(s) => s,
                    Err(e) => {
                        eprintln!("error: {e}");
                        return ExitCode::FAILURE;
                    }
                },
                None => Scenario::boomtown(),
            };
            if let Some(frames) = frames {
                scenario.frames = frames;
            }

            let summary = runner::run(&scenario);
            let json = if pretty {
                serde_json::to_string_pretty(&summary)
            } else {
                serde_json::to_string(&summary)
            };
            match json {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: failed to encode summary: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
