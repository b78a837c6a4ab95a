// ABOUTME: CLI argument parsing and command routing for firm-intake
//
// Provides command-line access to the intake engine:
// - Inspecting wizard steps and challenge-type phase defaults (steps, phases)
// - Running the flat-to-nested transform on a saved form bag (transform)
// - Inspecting or discarding the stored new-firm draft (draft)
// - Submitting a form bag to the admin API (submit)

pub mod draft;
pub mod inspect;
pub mod submit;
pub mod transform;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use firm_intake::payload::FlatPayload;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Intake wizard engine for the prop-firm review admin
#[derive(Parser)]
#[command(name = "firm-intake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Config file (defaults to ~/.firm-intake/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Output format for commands
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List wizard steps and the fields each one requires
    Steps,

    /// Show the default evaluation phases for a challenge type
    Phases(PhasesArgs),

    /// Convert a flat form bag (JSON object) into the nested payload
    Transform(TransformArgs),

    /// Inspect or discard the saved new-firm draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Upload, transform and save a flat form bag
    Submit(SubmitArgs),
}

#[derive(clap::Args)]
pub struct PhasesArgs {
    /// Challenge type tag (single-phase, two-phase, three-phase, instant)
    pub challenge_type: String,
}

#[derive(clap::Args)]
pub struct TransformArgs {
    /// Path to the flat JSON bag, or '-' for stdin
    pub file: PathBuf,
}

#[derive(Subcommand)]
pub enum DraftCommand {
    /// Print the stored draft
    Show,
    /// Delete the stored draft
    Clear,
}

#[derive(clap::Args)]
pub struct SubmitArgs {
    /// Path to the flat JSON bag, or '-' for stdin
    pub file: PathBuf,

    /// Update the firm with this id instead of creating one
    #[arg(long)]
    pub id: Option<String>,

    /// Logo image uploaded before saving
    #[arg(long)]
    pub logo: Option<PathBuf>,

    /// Save to an in-memory store instead of the API
    #[arg(long)]
    pub dry_run: bool,

    /// Submit even if wizard step validation fails
    #[arg(long)]
    pub force: bool,
}

/// Read a flat bag from a file or stdin
pub fn read_flat_payload(path: &Path) -> Result<FlatPayload> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload from {}", path.display()))?
    };

    match serde_json::from_str::<Value>(&content).context("Payload is not valid JSON")? {
        Value::Object(fields) => Ok(FlatPayload::from_fields(fields)),
        _ => anyhow::bail!("Payload must be a JSON object"),
    }
}

/// Pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}
