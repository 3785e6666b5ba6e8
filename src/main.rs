//! snarl CLI - Literate Programming Document Processor

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use snarl::commands;
use snarl::config::{read_config, read_config_file, Syntax};
use snarl::errors::Result;
use snarl::interface::Context;

#[derive(Parser)]
#[command(name = "snarl")]
#[command(author, version, about = "Literate programming document processor", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    directory: Option<PathBuf>,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Directive syntax of the documents
    #[arg(long, global = true, value_enum)]
    syntax: Option<Syntax>,

    /// Skip unreadable includes with a warning
    #[arg(long, global = true)]
    ignore_missing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document for readers
    Weave {
        /// Write to this file instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document to weave (standard input if omitted or '-')
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Write the source files described by documents
    Tangle {
        /// Only tangle blocks with this tag
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Tangle this block instead of the file blocks
        #[arg(short, long = "block", value_name = "NAME", conflicts_with = "tags")]
        blocks: Vec<String>,

        /// Tangle every labeled block (only tagged ones with --tag)
        #[arg(short, long)]
        all: bool,

        /// Print the content instead of writing files
        #[arg(long)]
        stdout: bool,

        /// Directory to write files into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Replace existing files
        #[arg(short = 'w', long)]
        overwrite: bool,

        /// Dry run - show what would be done without doing it
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Documents to tangle (configured source patterns if omitted, '-' for standard input)
        #[arg(value_name = "FILE")]
        inputs: Vec<PathBuf>,
    },

    /// List the files documents tangle to
    Files {
        /// Only list file blocks with this tag
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// List every labeled block
        #[arg(short, long)]
        all: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,

        /// Documents to inspect (configured source patterns if omitted, '-' for standard input)
        #[arg(value_name = "FILE")]
        inputs: Vec<PathBuf>,
    },
}

fn log_filter(verbose: u8) -> EnvFilter {
    if std::env::var_os("RUST_LOG").is_some() {
        return EnvFilter::from_default_env();
    }
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::new(level)
}

fn build_context(cli: &Cli) -> Result<Context> {
    let base_dir = match &cli.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let mut config = match &cli.config {
        Some(path) => read_config_file(path)?,
        None => read_config(&base_dir)?,
    };
    if let Some(syntax) = cli.syntax {
        config.syntax = syntax;
    }
    if cli.ignore_missing {
        config.ignore_missing = true;
    }
    if let Commands::Tangle {
        output_dir: Some(dir),
        ..
    } = &cli.command
    {
        config.output_dir = Some(dir.clone());
    }

    Ok(Context::new(config, base_dir))
}

fn run(cli: Cli) -> Result<()> {
    let ctx = build_context(&cli)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Weave { output, input } => {
            let options = commands::WeaveOptions { input, output };
            commands::weave(&ctx, options, &mut out)?;
        }

        Commands::Tangle {
            tags,
            blocks,
            all,
            stdout,
            output_dir: _,
            overwrite,
            dry_run,
            inputs,
        } => {
            let options = commands::TangleOptions {
                inputs,
                tags,
                blocks,
                all,
                stdout,
                overwrite,
                dry_run,
            };
            commands::tangle(&ctx, options, &mut out)?;
        }

        Commands::Files {
            tags,
            all,
            json,
            inputs,
        } => {
            let options = commands::FilesOptions {
                inputs,
                tags,
                all,
                json,
            };
            commands::files(&ctx, options, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
