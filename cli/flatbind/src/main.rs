//! flatbind CLI: generate a flat C boundary for a C++ object library.

mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flatbind", version, about = "Flat C binding generator for C++ libraries")]
struct Cli {
    /// Log at debug level unless FLATBIND_LOG or RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the binding source, C header and metadata
    Generate {
        /// Declaration file (.decl.toml or .decl.json)
        #[arg(long)]
        decl: PathBuf,
        /// Generator configuration (default: nearest flatbind.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// File stem for the three artifacts
        #[arg(long, default_value = "bindings")]
        stem: String,
    },
    /// Run the whole pipeline without writing anything
    Check {
        /// Declaration file (.decl.toml or .decl.json)
        #[arg(long)]
        decl: PathBuf,
        /// Generator configuration (default: nearest flatbind.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the resolved export table
    Inspect {
        /// Declaration file (.decl.toml or .decl.json)
        #[arg(long)]
        decl: PathBuf,
        /// Generator configuration (default: nearest flatbind.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format (human, json)
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Generate {
            decl,
            config,
            out_dir,
            stem,
        } => {
            let config = config::resolve(config.as_deref(), &cwd)?;
            commands::generate::run(&decl, &config, &out_dir, &stem)
        }

        Commands::Check { decl, config } => {
            let config = config::resolve(config.as_deref(), &cwd)?;
            commands::check::run(&decl, &config)
        }

        Commands::Inspect {
            decl,
            config,
            format,
        } => {
            let format = commands::inspect::Format::parse(format.as_deref())?;
            let config = config::resolve(config.as_deref(), &cwd)?;
            commands::inspect::run(&decl, &config, format)
        }
    }
}
