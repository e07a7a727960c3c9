//! Command-line host for the recspec audio analysis engine.
//!
//! A thin dispatcher over the `recspec_cli` library crate: matches on the
//! parsed subcommand and turns its `Result` into a process exit code.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use recspec_cli::cli_args::{Cli, Commands};
use recspec_cli::input::collect_inputs;
use recspec_cli::progress::ColoredProgressSink;
use recspec_cli::render::{render_human, render_json, render_summary};
use recspec_types::{AnalysisMode, CancellationToken, FilenameRule, NullProgressSink, ProgressSink};
use recspec_validate::{PresetRegistry, ScriptMatchConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Presets => run_presets(),
        Commands::Analyze {
            input,
            preset,
            concurrency,
            standard,
            json,
            script_bases,
            speaker_id,
        } => run_analyze(&input, &preset, concurrency, standard, json, script_bases, speaker_id),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", colored::Colorize::red("error"));
            ExitCode::FAILURE
        }
    }
}

fn run_presets() -> Result<()> {
    let registry = PresetRegistry::default_presets();
    for id in registry.ids() {
        println!("{id}");
    }
    Ok(())
}

fn run_analyze(
    input: &str,
    preset_id: &str,
    concurrency: usize,
    standard: bool,
    json: bool,
    script_bases: Vec<String>,
    speaker_id: Option<String>,
) -> Result<()> {
    let registry = PresetRegistry::default_presets();
    let preset = registry
        .lookup(preset_id)
        .with_context(|| format!("unrecognized preset id: {preset_id} (see `recspec presets`)"))?
        .clone();

    if preset.filename_rule == Some(FilenameRule::ScriptMatch) && script_bases.is_empty() {
        bail!(
            "preset '{preset_id}' requires --script-bases and --speaker-id for its filename rule"
        );
    }

    let inputs = collect_inputs(std::path::Path::new(input))?;
    if inputs.is_empty() {
        bail!("no input files found at {input}");
    }
    let names: Vec<String> = inputs.iter().map(|i| i.name.clone()).collect();

    let progress_sink: Arc<dyn ProgressSink> = if json {
        Arc::new(NullProgressSink)
    } else {
        Arc::new(ColoredProgressSink::new(names.clone()))
    };

    let mut options = recspec_batch::BatchOptions::new(preset, progress_sink)
        .with_concurrency(concurrency.max(1))
        .with_analysis_mode(if standard {
            AnalysisMode::Standard
        } else {
            AnalysisMode::Experimental
        })
        .with_cancellation_token(CancellationToken::new());

    if !script_bases.is_empty() {
        let expected_speaker_id = speaker_id
            .context("--speaker-id is required alongside --script-bases")?;
        options = options.with_script_match(ScriptMatchConfig {
            allowed_script_bases: script_bases,
            expected_speaker_id,
        });
    }

    let outcome = recspec_batch::run_batch(inputs, options)?;

    if json {
        let named: Vec<(String, recspec_types::Report)> =
            names.into_iter().zip(outcome.reports).collect();
        println!("{}", render_json(&named)?);
    } else {
        for (name, report) in names.iter().zip(&outcome.reports) {
            print!("{}", render_human(name, report));
        }
        println!("{}", render_summary(&outcome.summary));
    }

    Ok(())
}
