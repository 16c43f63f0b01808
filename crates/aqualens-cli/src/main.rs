mod commands;
mod progress;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aqualens", about = "Underwater image enhancement tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show image statistics and water-type classification
    Info(commands::info::InfoArgs),
    /// Enhance a single image
    Enhance(commands::enhance::EnhanceArgs),
    /// Print the auto-tuned configuration for an image
    Autotune(commands::autotune::AutotuneArgs),
    /// Enhance and score the result with the quality analyzer
    Quality(commands::quality::QualityArgs),
    /// Enhance an image sequence frame by frame
    Video(commands::video::VideoArgs),
    /// Print or write the default preset
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Enhance(args) => commands::enhance::run(args),
        Commands::Autotune(args) => commands::autotune::run(args),
        Commands::Quality(args) => commands::quality::run(args),
        Commands::Video(args) => commands::video::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
