use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut types = Vec::new();

    // Budget building blocks
    types.push(clean_type(Amount::export_to_string()?));
    types.push(clean_type(IncomeAmounts::export_to_string()?));
    types.push(clean_type(HousingCharges::export_to_string()?));
    types.push(clean_type(ChildrenCharges::export_to_string()?));
    types.push(clean_type(OtherCharges::export_to_string()?));
    types.push(clean_type(ChargeGroups::export_to_string()?));
    types.push(clean_type(Insurance::export_to_string()?));
    types.push(clean_type(Taxes::export_to_string()?));
    types.push(clean_type(Credit::export_to_string()?));
    types.push(clean_type(CreditKind::export_to_string()?));
    types.push(clean_type(CreditGroups::export_to_string()?));
    types.push(clean_type(BudgetTotals::export_to_string()?));

    // Dossier types
    types.push(clean_type(Contact::export_to_string()?));
    types.push(clean_type(Consents::export_to_string()?));
    types.push(clean_type(Attachment::export_to_string()?));
    types.push(clean_type(DossierSubmission::export_to_string()?));
    types.push(clean_type(Dossier::export_to_string()?));
    types.push(clean_type(DossierSummary::export_to_string()?));
    types.push(clean_type(DossierListResponse::export_to_string()?));
    types.push(clean_type(DossierDetail::export_to_string()?));
    types.push(clean_type(SubmitDossierResponse::export_to_string()?));
    types.push(clean_type(DeleteDossierResponse::export_to_string()?));

    // Upload progress
    types.push(clean_type(FileUploadStatus::export_to_string()?));
    types.push(clean_type(FileUploadProgress::export_to_string()?));
    types.push(clean_type(UploadProgress::export_to_string()?));

    // Auth
    types.push(clean_type(LoginRequest::export_to_string()?));
    types.push(clean_type(LoginResponse::export_to_string()?));
    types.push(clean_type(ErrorResponse::export_to_string()?));

    let output_dir = Path::new("../web/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    // Everything lands in a single file, so cross-type imports are dropped
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
