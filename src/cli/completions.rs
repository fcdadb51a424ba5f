//! Shell completion scripts for `deckhand`

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap_complete::{Shell, generate};

const BIN_NAME: &str = "deckhand";

/// Writes the completion script for `shell` to `out`
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    generate(shell, &mut super::build_cli(), BIN_NAME, out);
}

/// Writes the script to `output`, or to stdout when no path is given
pub fn emit(shell: Shell, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        write_completions(shell, &mut io::stdout().lock());
        return Ok(());
    };

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_completions(shell, &mut writer);
    writer
        .flush()
        .with_context(|| format!("writing completions to {}", path.display()))
}
