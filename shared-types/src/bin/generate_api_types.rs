use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Organization types
    types.push(clean_type(OrganizationStatus::export_to_string()?));
    types.push(clean_type(Organization::export_to_string()?));
    types.push(clean_type(OrganizationSearchRequest::export_to_string()?));
    types.push(clean_type(OrganizationSearchResponse::export_to_string()?));

    // Call summary types
    types.push(clean_type(CallSummary::export_to_string()?));
    types.push(clean_type(CallRecord::export_to_string()?));
    types.push(clean_type(CallSummaryResponse::export_to_string()?));

    // Voice call types
    types.push(clean_type(VoiceCallRequest::export_to_string()?));
    types.push(clean_type(VoiceCallResponse::export_to_string()?));
    types.push(clean_type(CallStatusResponse::export_to_string()?));

    // Agent types
    types.push(clean_type(RefineRequest::export_to_string()?));
    types.push(clean_type(RefineResponse::export_to_string()?));

    // Notes types
    types.push(clean_type(NoteStatus::export_to_string()?));
    types.push(clean_type(OrgNote::export_to_string()?));
    types.push(clean_type(NotesResponse::export_to_string()?));

    // Settings types
    types.push(clean_type(ProviderStatus::export_to_string()?));
    types.push(clean_type(SettingsResponse::export_to_string()?));

    let output_dir = Path::new("../gui/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    // All types land in one file, so cross-type imports are dropped
    let filtered: Vec<&str> = type_def
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
