//! `codefence styles` command implementation.

use std::io::{self, Write};

use codefence::BlockRenderer;

use crate::error::CliError;

/// Write the names of all available styles to stdout, one per line.
pub(crate) fn execute() -> Result<(), CliError> {
    let renderer = BlockRenderer::new();
    let mut names = renderer.styles().names();
    names.sort();

    let mut stdout = io::stdout().lock();
    for name in names {
        writeln!(stdout, "{name}")?;
    }
    Ok(())
}
