//! `codefence css` command implementation.

use std::io;
use std::path::PathBuf;

use clap::Args;
use codefence_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;
use crate::renderer::build_renderer;

/// Arguments for the css command.
#[derive(Args)]
pub(crate) struct CssArgs {
    /// Style name (default: configured style).
    #[arg(short, long)]
    style: Option<String>,

    /// Path to configuration file (default: auto-discover codefence.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CssArgs {
    /// Write the style sheet of the selected style to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or stdout cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            style: self.style,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let renderer = build_renderer(&config, None);

        let style = config.highlight.style.as_str();
        if renderer.styles().style(style).is_none() {
            Output::new().warning(&format!("Unknown style {style:?}, using fallback"));
        }

        renderer.write_css(&mut io::stdout().lock(), Some(style))?;
        Ok(())
    }
}
