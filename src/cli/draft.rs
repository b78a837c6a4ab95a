// ABOUTME: CLI draft command - show or clear the locally saved new-firm draft

use super::{print_json, DraftCommand, OutputFormat};
use anyhow::Result;
use firm_intake::config::AppConfig;
use firm_intake::models::EntityKind;
use firm_intake::wizard::{DraftStore, StepRegistry};
use serde_json::Value;

/// Execute the draft command
pub fn execute(command: DraftCommand, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let Some(drafts) = config.draft_store(EntityKind::Firm)? else {
        println!("Draft saving is disabled (drafts.enabled = false)");
        return Ok(());
    };

    match command {
        DraftCommand::Show => show(&drafts, format),
        DraftCommand::Clear => {
            if drafts.clear() {
                println!("Draft cleared");
                Ok(())
            } else {
                anyhow::bail!("Could not clear draft, see logs for details")
            }
        }
    }
}

fn show(drafts: &DraftStore, format: OutputFormat) -> Result<()> {
    let Some(snapshot) = drafts.load() else {
        println!("No saved draft");
        return Ok(());
    };

    match format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Text => {
            let registry = StepRegistry::firm();
            let name = snapshot
                .form_data
                .get(Some("basicInfo"), "name")
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
                .unwrap_or("(unnamed)");
            let step_title = registry
                .get(snapshot.current_step)
                .map(|s| s.title)
                .unwrap_or("?");
            let saved_at = snapshot
                .saved_at()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| snapshot.timestamp.to_string());

            println!("Firm:      {}", name);
            println!("Step:      {} of {} ({})", snapshot.current_step, registry.len(), step_title);
            println!("Completed: {:?}", snapshot.completed_steps);
            println!("Saved at:  {}", saved_at);
        }
    }
    Ok(())
}
