// ABOUTME: CLI submit command - validate, upload and save a flat form bag

use super::{print_json, read_flat_payload, OutputFormat, SubmitArgs};
use anyhow::{Context, Result};
use firm_intake::config::AppConfig;
use firm_intake::models::{EntityDraft, EntityKind};
use firm_intake::payload::{AttachmentFile, PayloadTransformer};
use firm_intake::schema::FieldSchema;
use firm_intake::submission::{
    AttachmentUploader, EntityStore, HttpAttachmentUploader, HttpEntityStore,
    MemoryAttachmentUploader, MemoryEntityStore, SaveAction, SubmissionCoordinator,
};
use firm_intake::wizard::StepRegistry;
use std::sync::Arc;
use tracing::info;

/// Execute the submit command
pub async fn execute(args: SubmitArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let schema = FieldSchema::firm();
    let mut flat = read_flat_payload(&args.file)?;

    if !args.force {
        check_steps(&schema, &flat)?;
    }

    if let Some(path) = &args.logo {
        let file = AttachmentFile::from_path(path)
            .with_context(|| format!("Failed to read logo {}", path.display()))?;
        flat = flat.with_attachment(file);
    }

    let (store, uploader): (Arc<dyn EntityStore>, Arc<dyn AttachmentUploader>) = if args.dry_run {
        info!("Dry run, saving to memory");
        (
            Arc::new(MemoryEntityStore::new(EntityKind::Firm)),
            Arc::new(MemoryAttachmentUploader::new()),
        )
    } else {
        (
            Arc::new(HttpEntityStore::new(&config.api, EntityKind::Firm)?),
            Arc::new(HttpAttachmentUploader::new(&config.api)?),
        )
    };

    let coordinator = SubmissionCoordinator::new(store, uploader, PayloadTransformer::new(schema))
        .with_upload_folder(config.api.upload_folder.clone());

    let outcome = match coordinator.persist(args.id.as_deref(), &flat).await {
        Ok(outcome) => outcome,
        Err(e) => anyhow::bail!("{} ({})", e.user_message(), e),
    };

    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Text => {
            let verb = match outcome.action {
                SaveAction::Created => "Created",
                SaveAction::Updated => "Updated",
            };
            println!("{} firm {}", verb, outcome.id);
            println!("Next: {}", outcome.redirect_to);
        }
    }
    Ok(())
}

/// Run every step's validation against the bag, as the wizard would before the final step
fn check_steps(schema: &FieldSchema, flat: &firm_intake::payload::FlatPayload) -> Result<()> {
    let nested = PayloadTransformer::new(schema.clone()).transform(flat, None);
    let draft = EntityDraft::from_value(nested.into_value())
        .context("Transformed payload is not an object")?;

    let mut problems = Vec::new();
    for step in StepRegistry::firm().iter() {
        for (key, message) in schema.validate_section(&draft, step.section).iter() {
            problems.push(format!("step {} ({}): {}: {}", step.number, step.title, key, message));
        }
    }

    if problems.is_empty() {
        return Ok(());
    }
    for problem in &problems {
        eprintln!("{}", problem);
    }
    anyhow::bail!("{} field(s) failed validation, use --force to submit anyway", problems.len())
}
