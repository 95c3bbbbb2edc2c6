//! CLI frontend for the npcgen character generator.

mod commands;
mod schema_file;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "npcgen",
    about = "npcgen: random NPCs from weighted trait schemas",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log every category resolution to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a schema file and report dependency cycles
    Check {
        /// Path to the schema JSON file
        schema: PathBuf,
    },

    /// Print the order in which categories are resolved
    Order {
        /// Path to the schema JSON file
        schema: PathBuf,
    },

    /// List the optional schema features a schema uses
    Features {
        /// Path to the schema JSON file
        schema: PathBuf,
    },

    /// Generate NPCs from a schema
    Generate {
        /// Path to the schema JSON file
        schema: PathBuf,

        /// Number of NPCs to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// RNG seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format: table, json
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show a different trait in place of a chosen one
        #[arg(short = 'r', long = "replace", value_name = "CATEGORY:TRAIT=REPLACEMENT")]
        replacements: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { schema } => commands::check::run(&schema),
        Commands::Order { schema } => commands::order::run(&schema),
        Commands::Features { schema } => commands::features::run(&schema),
        Commands::Generate {
            schema,
            count,
            seed,
            format,
            output,
            replacements,
        } => commands::generate::run(
            &schema,
            count,
            seed,
            &format,
            output.as_deref(),
            &replacements,
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
