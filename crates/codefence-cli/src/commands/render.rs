//! `codefence render` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use clap::Args;
use codefence::{CssSink, MarkdownHighlighter};
use codefence_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;
use crate::renderer::{build_renderer, dedup_style_sheets};

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    input: PathBuf,

    /// Output HTML file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Style sheet output file (overrides config).
    #[arg(long)]
    css: Option<PathBuf>,

    /// Style name (overrides config).
    #[arg(short, long)]
    style: Option<String>,

    /// Emit CSS classes instead of inline styles (overrides config).
    #[arg(long)]
    classes: bool,

    /// Path to configuration file (default: auto-discover codefence.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a file cannot be read or written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            style: self.style,
            classes: self.classes.then_some(true),
            css: self.css,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markdown = std::fs::read_to_string(&self.input)?;

        let css_buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
        let css_sink = config
            .output_resolved
            .css
            .is_some()
            .then(|| Arc::clone(&css_buffer) as CssSink);
        let renderer = build_renderer(&config, css_sink);

        let html = MarkdownHighlighter::new(&renderer).render(&markdown)?;
        tracing::info!(input = %self.input.display(), bytes = html.len(), "Rendered document");

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => io::stdout().lock().write_all(html.as_bytes())?,
        }

        if let Some(path) = &config.output_resolved.css {
            let css = css_buffer.lock().unwrap_or_else(PoisonError::into_inner);
            std::fs::write(path, dedup_style_sheets(&String::from_utf8_lossy(&css)))?;
            output.success(&format!("Wrote {}", path.display()));
        }

        Ok(())
    }
}
