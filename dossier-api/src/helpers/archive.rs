use shared_types::DossierDetail;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the form data entry inside a dossier archive
pub const FORM_ENTRY: &str = "formulaire.json";

/// Entry name for an attachment, made unique within the archive
fn piece_name(name: &str, taken: &mut HashSet<String>) -> String {
    let base = crate::storage::sanitize_file_name(name);
    let mut candidate = format!("pieces/{}", base);
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("pieces/{}_{}", n, base);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Bundle a dossier as a zip: the normalized form plus every attachment that could be fetched.
pub fn build_archive(detail: &DossierDetail, pieces: &[(String, Vec<u8>)]) -> anyhow::Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(FORM_ENTRY, options)?;
    zip.write_all(serde_json::to_string_pretty(detail)?.as_bytes())?;

    let mut taken = HashSet::new();
    for (name, bytes) in pieces {
        zip.start_file(piece_name(name, &mut taken), options)?;
        zip.write_all(bytes)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn detail() -> DossierDetail {
        let doc: shared_types::DossierDocument = serde_json::from_value(serde_json::json!({
            "contact": { "first_name": "Léa", "last_name": "Martin" },
            "consents": { "processing": true }
        }))
        .unwrap();
        budget::normalize("d-1", doc)
    }

    #[test]
    fn test_archive_contents() {
        let pieces = vec![
            ("avis impot.pdf".to_string(), b"pdf-1".to_vec()),
            ("avis impot.pdf".to_string(), b"pdf-2".to_vec()),
        ];
        let bytes = build_archive(&detail(), &pieces).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let mut form = String::new();
        archive
            .by_name(FORM_ENTRY)
            .unwrap()
            .read_to_string(&mut form)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&form).unwrap();
        assert_eq!(value["id"], "d-1");
        assert_eq!(value["contact"]["last_name"], "Martin");

        let mut first = Vec::new();
        archive
            .by_name("pieces/avis_impot.pdf")
            .unwrap()
            .read_to_end(&mut first)
            .unwrap();
        assert_eq!(first, b"pdf-1");
        assert!(archive.by_name("pieces/2_avis_impot.pdf").is_ok());
    }
}
