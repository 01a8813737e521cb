use crate::database::AsyncDbConnection;
use anyhow::Result;
use rusqlite::OptionalExtension;
use shared_types::{Dossier, DossierDetail, DossierDocument, DossierSummary};

pub async fn insert_dossier(conn: AsyncDbConnection, dossier: &Dossier) -> Result<String> {
    let conn = conn.lock().await?;
    let id = uuid::Uuid::new_v4().to_string();
    let document = serde_json::to_string(dossier)?;

    conn.execute(
        "INSERT INTO dossiers (id, created_at, first_name, last_name, email, document)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            &id,
            dossier.created_at,
            dossier.contact.first_name.trim(),
            dossier.contact.last_name.trim(),
            dossier.contact.email.trim(),
            &document
        ],
    )?;

    Ok(id)
}

/// Fetch a dossier, normalized whatever layout it was stored with
pub async fn get_dossier(conn: AsyncDbConnection, id: &str) -> Result<Option<DossierDetail>> {
    let conn = conn.lock().await?;

    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM dossiers WHERE id = ?1",
            [id],
            |row| row.get(0),
        )
        .optional()?;

    match document {
        Some(json) => {
            let doc: DossierDocument = serde_json::from_str(&json)
                .map_err(|e| anyhow::anyhow!("Corrupt document for dossier {}: {}", id, e))?;
            Ok(Some(budget::normalize(id, doc)))
        }
        None => Ok(None),
    }
}

/// Dashboard rows, newest first, optionally filtered by first/last name
pub async fn list_dossiers(
    conn: AsyncDbConnection,
    search: Option<&str>,
) -> Result<Vec<DossierSummary>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, email, created_at
         FROM dossiers
         ORDER BY created_at DESC, id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(DossierSummary {
                id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                email: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(budget::filter_summaries(rows, search))
}

/// Returns false when no such dossier existed
pub async fn delete_dossier(conn: AsyncDbConnection, id: &str) -> Result<bool> {
    let conn = conn.lock().await?;
    let affected = conn.execute("DELETE FROM dossiers WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

/// Store a raw JSON document as-is (imports of older exports)
pub async fn insert_raw_document(
    conn: AsyncDbConnection,
    id: &str,
    document: &serde_json::Value,
) -> Result<()> {
    let conn = conn.lock().await?;
    let detail = budget::normalize(id, serde_json::from_value(document.clone())?);
    let contact = &detail.dossier.contact;

    conn.execute(
        "INSERT INTO dossiers (id, created_at, first_name, last_name, email, document)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            id,
            detail.dossier.created_at,
            contact.first_name.trim(),
            contact.last_name.trim(),
            contact.email.trim(),
            serde_json::to_string(document)?
        ],
    )?;

    Ok(())
}
