use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;

use jcg_cli::commands::{analyze, init};

#[derive(Parser)]
#[command(name = "jcg")]
#[command(version, about = "Call graph extraction for compiled Spring applications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write logs to this file in addition to the console
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze compiled classes and write call graph artifacts
    Analyze {
        /// Path to the configuration file
        #[arg(short, long, default_value = "jcg.toml")]
        config: String,
    },
    /// Create a starter configuration file
    Init {
        /// Where to write the configuration file
        #[arg(default_value = "jcg.toml")]
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = jcg_core::init_from_args(cli.log_level.clone(), cli.log_file.clone(), cli.verbose)
    {
        eprintln!("Failed to initialize logging: {e:#}");
    }

    let result = match cli.command {
        Commands::Analyze { config } => analyze::execute_analyze(&config, cli.verbose),
        Commands::Init { path } => init::execute_init(&path),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(1);
    }
}
