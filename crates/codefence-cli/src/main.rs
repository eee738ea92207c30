//! codefence CLI - syntax highlighting for markdown code blocks.
//!
//! Provides commands for:
//! - `render`: Render a markdown file to HTML with highlighted code blocks
//! - `styles`: List the available styles
//! - `css`: Write the style sheet of a style

mod commands;
mod error;
mod output;
mod renderer;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CssArgs, RenderArgs};
use output::Output;

/// codefence - Syntax highlighting for markdown code blocks.
#[derive(Parser)]
#[command(name = "codefence", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown file to HTML.
    Render(RenderArgs),
    /// List available styles.
    Styles,
    /// Write the style sheet of a style to stdout.
    Css(CssArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Styles => commands::styles::execute(),
        Commands::Css(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
