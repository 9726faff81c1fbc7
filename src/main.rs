use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use vaultsmith::commands;

#[derive(Parser)]
#[command(name = "vaultsmith")]
#[command(about = "Vault helpers: code files to Markdown notes, semantically similar tags", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, action = ArgAction::Count, global = true, help = "More log output (-v info, -vv debug)")]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed tags, cache the vectors and rank the most similar pairs
    Similar {
        #[arg(long, help = "Project directory (default: $VAULTSMITH_PROJECT_PATH or cwd)")]
        project: Option<PathBuf>,
        #[arg(long, help = "Tag list file, relative to the project (default: tags.txt)")]
        tags: Option<PathBuf>,
        #[arg(long, help = "Number of nearest pairs to print")]
        top: Option<usize>,
        #[arg(long, help = "Compare every cached tag, not only the tag list")]
        include_cached: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show the embedding cache status
    Cache {
        #[arg(long, help = "Project directory (default: $VAULTSMITH_PROJECT_PATH or cwd)")]
        project: Option<PathBuf>,
        #[arg(short, long, help = "List cached tags")]
        list: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Convert .py and .R files into Markdown notes with code blocks
    Convert {
        /// Folder containing the code files
        folder: PathBuf,
        #[arg(short, long, help = "Include subfolders")]
        recursive: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Similar {
            project,
            tags,
            top,
            include_cached,
            json,
        } => commands::similar::run(
            project.as_deref(),
            tags.as_deref(),
            top,
            include_cached,
            json,
        ),
        Commands::Cache {
            project,
            list,
            json,
        } => commands::cache::run(project.as_deref(), list, json),
        Commands::Convert {
            folder,
            recursive,
            json,
        } => commands::convert::run(&folder, recursive, json),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
