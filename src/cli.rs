use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Config;
use crate::desk::Desk;
use crate::note::{NoteError, NoteId};
use crate::palette::PaletteError;

#[derive(Parser)]
#[command(name = "stickies")]
#[command(about = "Sticky notes and sketches in the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (separate dev config and log)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI with an empty note (default if no subcommand)
    Tui,
    /// Launch the TUI with one text note per file
    Open {
        /// Plain-text files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the configured color palette
    Palette {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Palette error: {0}")]
    PaletteError(#[from] PaletteError),
    #[error("Import failed: {0}")]
    ImportError(#[from] NoteError),
    #[error("Failed to serialize palette: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),
}

/// Handle the palette command
pub fn handle_palette(config: &Config, json: bool, out: &mut impl Write) -> Result<(), CliError> {
    let palette = config.palette.build()?;

    if json {
        serde_json::to_writer_pretty(&mut *out, palette.entries())?;
        writeln!(out)?;
        return Ok(());
    }

    for (index, entry) in palette.entries().iter().enumerate() {
        writeln!(
            out,
            "{:>2}  {:<10} {}  {}",
            index + 1,
            entry.name,
            entry.value,
            entry.icon_ref.display()
        )?;
    }
    Ok(())
}

/// Import every file into a new text note, stopping at the first failure
pub fn handle_open(desk: &mut Desk, files: &[PathBuf]) -> Result<Vec<NoteId>, CliError> {
    files
        .iter()
        .map(|path| desk.import_text(path).map_err(CliError::from))
        .collect()
}
