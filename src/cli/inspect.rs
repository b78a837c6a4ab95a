// ABOUTME: CLI steps and phases commands - describe the wizard and challenge-type defaults

use super::{print_json, OutputFormat, PhasesArgs};
use anyhow::Result;
use firm_intake::schema::FieldSchema;
use firm_intake::wizard::{ChallengeType, StepRegistry};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StepInfo {
    number: usize,
    title: &'static str,
    section: &'static str,
    renderer: &'static str,
    required: Vec<&'static str>,
}

/// Execute the steps command
pub fn steps(format: OutputFormat) -> Result<()> {
    let registry = StepRegistry::firm();
    let schema = FieldSchema::firm();

    let steps: Vec<StepInfo> = registry
        .iter()
        .map(|step| StepInfo {
            number: step.number,
            title: step.title,
            section: step.section,
            renderer: step.renderer,
            required: schema
                .fields_in(step.section)
                .filter(|f| f.required)
                .map(|f| f.key)
                .collect(),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&steps)?,
        OutputFormat::Text => {
            for step in &steps {
                println!("{}. {} [{}]", step.number, step.title, step.section);
                if step.required.is_empty() {
                    println!("     required: (none)");
                } else {
                    println!("     required: {}", step.required.join(", "));
                }
            }
        }
    }
    Ok(())
}

/// Execute the phases command
pub fn phases(args: PhasesArgs, format: OutputFormat) -> Result<()> {
    let challenge_type: ChallengeType = args.challenge_type.parse()?;
    let phases = challenge_type.default_phases();

    match format {
        OutputFormat::Json => print_json(&phases)?,
        OutputFormat::Text => {
            if phases.is_empty() {
                println!("{}: no evaluation phases", challenge_type);
            }
            for phase in &phases {
                println!("{}: phase {} - {}", challenge_type, phase.step_number, phase.name);
            }
        }
    }
    Ok(())
}
