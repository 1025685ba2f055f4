use std::path::Path;

use anyhow::Result;

use flashcard_assist::flashcards::apply_result_files;

use crate::OutputFormat;

pub fn run(
    rows_path: &Path,
    result_path: &Path,
    request_path: Option<&Path>,
    output_path: Option<&Path>,
    format: &OutputFormat,
) -> Result<()> {
    let applied = apply_result_files(rows_path, result_path, request_path, output_path)?;
    let report = &applied.report;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Plain => {
            println!("Applied {} update(s) to {:?}", report.applied.len(), applied.output);
            for (label, ids) in [
                ("Unknown cards", &report.unknown),
                ("Outside selection", &report.out_of_scope),
                ("No changes", &report.empty),
            ] {
                if !ids.is_empty() {
                    println!("  {}: {}", label, ids.join(", "));
                }
            }
        }
    }

    Ok(())
}
