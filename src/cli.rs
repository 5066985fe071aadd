use std::path::PathBuf;

use clap::Parser;

/// Assigns pending tasks to free calendar time and writes the result back.
#[derive(Debug, Parser)]
#[command(name = "chronoslot", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "chronoslot.toml")]
    pub config: PathBuf,

    /// Compute the assignment and print it without writing to the calendar.
    #[arg(long)]
    pub dry_run: bool,

    /// Delete this application's previously written events before writing
    /// the new assignment.
    #[arg(long)]
    pub erase_owned: bool,
}
