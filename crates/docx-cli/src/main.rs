mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docx-route")]
#[command(version, about = "Inspect and dispatch DocX route trees", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "docx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve request paths and print the dispatch results as JSON
    Dispatch {
        /// Request paths to resolve
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Load every route file and print the route table
    Routes,

    /// Load every route file and report the first error
    Check,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = docx_router::Config::load(&cli.config)?;
    let router = config.router()?;

    match cli.command {
        Commands::Dispatch { paths } => commands::dispatch::execute(&router, &paths),
        Commands::Routes => commands::routes::execute(&router),
        Commands::Check => commands::check::execute(&router),
    }
}
