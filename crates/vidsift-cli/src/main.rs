//! vidsift CLI - Command-line interface for content-based video retrieval
//!
//! This binary computes video signatures under the available retrieval
//! models, builds reference tables from directories of inputs, and ranks a
//! reference table against a query.

use clap::{Args, Parser, Subcommand};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

use vidsift_cli::commands;
use vidsift_cli::commands::search::SearchArgs;
use vidsift_cli::settings::CommonOptions;

/// vidsift - Content-based video retrieval
#[derive(Parser)]
#[command(name = "vidsift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// HOG codebook table (overrides the config file)
    #[arg(long, global = true)]
    hog_codebook: Option<String>,

    /// HOF codebook table (overrides the config file)
    #[arg(long, global = true)]
    hof_codebook: Option<String>,

    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the retrieval models and their distance metrics
    Models {
        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Compute the signature of one input
    Signature {
        /// Model name (see `vidsift models`)
        #[arg(short, long)]
        model: String,

        /// Descriptor file, frame directory or activation bundle
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Build a reference table from a directory of inputs
    Index {
        /// Model name (see `vidsift models`)
        #[arg(short, long)]
        model: String,

        /// Directory holding one input per reference video
        #[arg(long)]
        input_dir: String,

        /// Reference table to write
        #[arg(short, long)]
        output: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Rank a reference table against a query
    Search {
        /// Model name (see `vidsift models`)
        #[arg(short, long)]
        model: String,

        /// Reference table written by `index`
        #[arg(short, long)]
        table: String,

        /// Raw query input
        #[arg(short, long, conflicts_with = "query_id", required_unless_present = "query_id")]
        input: Option<String>,

        /// Identifier of a table entry to use as the query
        #[arg(long)]
        query_id: Option<String>,

        /// Number of neighbors to return
        #[arg(short, default_value_t = 10)]
        k: usize,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("vidsift=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let options = CommonOptions {
        config: cli.global.config,
        hog_codebook: cli.global.hog_codebook,
        hof_codebook: cli.global.hof_codebook,
    };

    let result = match cli.command {
        Commands::Models { json } => commands::models::run(json),
        Commands::Signature { model, input, json } => {
            commands::signature::run(&model, &input, &options, json)
        }
        Commands::Index {
            model,
            input_dir,
            output,
            json,
        } => commands::index::run(&model, &input_dir, &output, &options, json),
        Commands::Search {
            model,
            table,
            input,
            query_id,
            k,
            json,
        } => {
            let args = SearchArgs {
                model,
                table,
                input,
                query_id,
                k,
            };
            commands::search::run(&args, &options, json)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
