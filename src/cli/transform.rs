// ABOUTME: CLI transform command - print the nested payload for a flat form bag

use super::{print_json, read_flat_payload, TransformArgs};
use anyhow::Result;
use firm_intake::payload::PayloadTransformer;
use firm_intake::schema::FieldSchema;

/// Execute the transform command
pub fn execute(args: TransformArgs) -> Result<()> {
    let flat = read_flat_payload(&args.file)?;
    let nested = PayloadTransformer::new(FieldSchema::firm()).transform(&flat, None);
    print_json(&nested)
}
