//! # textshift-cli
//!
//! Command-line front end for the textshift loader and converter.
//!
//! The CLI takes the place of a desktop front end: it triggers loads and
//! conversions with user-supplied paths and renders the events they emit.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::AppContext;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "textshift")]
#[command(about = "View text files and rewrite characters with a mapping table")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a text file, reporting progress, and print its summary
    View {
        /// File to load
        file: PathBuf,

        /// Also print the file content
        #[arg(long)]
        content: bool,

        /// Bytes per read
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// List viewable files in a directory
    List {
        /// Directory to scan
        dir: PathBuf,
    },

    /// Find every occurrence of a text in a file
    Find {
        /// File to search
        file: PathBuf,

        /// Text to look for
        needle: String,

        /// Match regardless of letter case
        #[arg(short, long)]
        ignore_case: bool,
    },

    /// Rewrite characters in a file or in every matching file of a directory
    Convert {
        /// Input file or directory
        path: PathBuf,

        /// Write converted files here instead of in place
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Mapping document (JSON); the builtin table is used otherwise
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// File name suffix selected in directory mode
        #[arg(short, long)]
        suffix: Option<String>,

        /// Stop the batch after the first failed file
        #[arg(long, overrides_with = "no_stop_on_error")]
        stop_on_error: bool,

        /// Keep converting after a failed file
        #[arg(long, overrides_with = "stop_on_error")]
        no_stop_on_error: bool,

        /// Apply rules one after another so later rules rewrite earlier output
        #[arg(long, overrides_with = "no_per_rule")]
        per_rule: bool,

        /// Apply rules in a single scan
        #[arg(long, overrides_with = "per_rule")]
        no_per_rule: bool,
    },

    /// Create, inspect, and edit mapping documents
    Mapping {
        #[command(subcommand)]
        action: MappingAction,
    },
}

#[derive(Subcommand)]
enum MappingAction {
    /// Write the builtin table to a new document
    Init {
        file: PathBuf,

        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// Print the rules of a document in order
    Show { file: PathBuf },

    /// Add a rule or change an existing one
    Set {
        file: PathBuf,
        from: String,
        to: String,
    },

    /// Delete a rule
    Remove { file: PathBuf, from: String },
}

/// A `--flag` / `--no-flag` pair; `None` keeps the configured value
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
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
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    let mut ctx = AppContext::new(config);

    match cli.command {
        Commands::View {
            file,
            content,
            chunk_size,
        } => {
            if let Some(size) = chunk_size {
                ctx.config.loader.chunk_size = size;
            }
            commands::view(&ctx, &file, content).await
        }
        Commands::List { dir } => commands::list(&ctx, &dir),
        Commands::Find {
            file,
            needle,
            ignore_case,
        } => commands::find(&ctx, &file, &needle, !ignore_case).await,
        Commands::Convert {
            path,
            output_dir,
            mapping,
            suffix,
            stop_on_error,
            no_stop_on_error,
            per_rule,
            no_per_rule,
        } => {
            let section = &mut ctx.config.convert;
            if output_dir.is_some() {
                section.output_dir = output_dir;
            }
            if mapping.is_some() {
                section.mapping = mapping;
            }
            if let Some(suffix) = suffix {
                section.suffix = suffix;
            }
            if let Some(stop) = switch(stop_on_error, no_stop_on_error) {
                section.stop_on_error = stop;
            }
            if let Some(per_rule) = switch(per_rule, no_per_rule) {
                section.per_rule = per_rule;
            }
            commands::convert(&ctx, path).await
        }
        Commands::Mapping { action } => match action {
            MappingAction::Init { file, force } => commands::mapping_init(&file, force),
            MappingAction::Show { file } => commands::mapping_show(&file),
            MappingAction::Set { file, from, to } => commands::mapping_set(&file, from, to),
            MappingAction::Remove { file, from } => commands::mapping_remove(&file, &from),
        },
    }
}
