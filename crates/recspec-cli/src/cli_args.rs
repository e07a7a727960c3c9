//! CLI argument definitions, kept separate from `main.rs` dispatch logic.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "recspec")]
#[command(author, version, about = "Audio recording specification analyzer", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one file or every file in a directory against a named preset
    Analyze {
        /// Path to a WAV file, or a directory to scan recursively
        input: String,

        /// Recognized preset id (see `recspec analyze --help` for the list)
        #[arg(short, long, default_value = "custom")]
        preset: String,

        /// Bounded parallelism for directory input (default 1)
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// Run only the always-on peak/level pass, skipping reverb,
        /// silence, stereo, and bleed
        #[arg(long)]
        standard: bool,

        /// Output machine-readable JSON instead of colored text
        #[arg(long)]
        json: bool,

        /// Allowed script base names for the `three-hour` preset's
        /// filename rule (comma-separated); required when `preset` is
        /// `three-hour`
        #[arg(long, value_delimiter = ',')]
        script_bases: Vec<String>,

        /// Expected speaker id for the `three-hour` preset's filename rule
        #[arg(long)]
        speaker_id: Option<String>,
    },

    /// List the recognized preset ids
    Presets,
}
