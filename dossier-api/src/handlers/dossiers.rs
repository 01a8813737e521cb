use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde::Deserialize;
use shared_types::{DossierListResponse, DossierSubmission};
use std::sync::Arc;

use super::{attachment_disposition, ApiError};
use crate::config::{ApiConfig, StorageConfig};
use crate::database::dossiers as db;
use crate::database::Database;
use crate::helpers::auth::AdvisorSession;
use crate::helpers::{archive, pdf};
use crate::jobs::dossier_manager::{DossierManager, PendingFile};

const META_FIELD: &str = "meta";
const FILE_FIELD_PREFIX: &str = "file_";

#[derive(Debug, Deserialize)]
pub struct SubmitQuery {
    pub upload_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// Parts of a submission request once the multipart body is drained
struct ParsedSubmission {
    meta: Option<Vec<u8>>,
    files: Vec<PendingFile>,
    rejected_files: Vec<String>,
}

fn invalid_body(e: impl std::fmt::Display) -> ApiError {
    ApiError::Validation(format!("Invalid multipart body: {}", e))
}

/// Drain the multipart body. Oversized files are set aside; an oversized
/// form part or request body aborts the whole submission.
async fn read_multipart(mut payload: Multipart, limits: &StorageConfig) -> Result<ParsedSubmission, ApiError> {
    let mut parsed = ParsedSubmission {
        meta: None,
        files: Vec::new(),
        rejected_files: Vec::new(),
    };
    let mut request_bytes = 0u64;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(invalid_body)?;

        let disposition = field.content_disposition();
        let field_name = disposition.get_name().unwrap_or_default().to_string();
        let file_name = disposition
            .get_filename()
            .map(|f| f.to_string())
            .unwrap_or_else(|| field_name.clone());

        let is_meta = field_name == META_FIELD;
        let is_file = field_name.starts_with(FILE_FIELD_PREFIX);

        let mut bytes = Vec::new();
        let mut too_large = false;
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(invalid_body)?;
            request_bytes += chunk.len() as u64;
            if request_bytes > limits.max_request_bytes {
                return Err(ApiError::PayloadTooLarge(format!(
                    "Submission larger than {} bytes",
                    limits.max_request_bytes
                )));
            }
            if too_large || !(is_meta || is_file) {
                continue;
            }
            if is_meta && (bytes.len() + chunk.len()) as u64 > limits.max_meta_bytes {
                return Err(ApiError::PayloadTooLarge(format!(
                    "Form data larger than {} bytes",
                    limits.max_meta_bytes
                )));
            }
            if is_file && (bytes.len() + chunk.len()) as u64 > limits.max_upload_bytes {
                // Keep draining the field, drop what was buffered
                too_large = true;
                bytes = Vec::new();
                continue;
            }
            bytes.extend_from_slice(&chunk);
        }

        if is_meta {
            parsed.meta = Some(bytes);
        } else if is_file {
            if too_large {
                tracing::warn!("Rejected {}: larger than {} bytes", file_name, limits.max_upload_bytes);
                parsed.rejected_files.push(file_name);
            } else {
                parsed.files.push(PendingFile {
                    name: file_name,
                    bytes,
                });
            }
        } else {
            tracing::debug!("Ignoring unexpected multipart field {:?}", field_name);
        }
    }

    Ok(parsed)
}

/// Public intake endpoint: the form data plus its supporting documents
pub async fn submit_dossier(
    manager: web::Data<Arc<DossierManager>>,
    config: web::Data<ApiConfig>,
    query: web::Query<SubmitQuery>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let parsed = read_multipart(payload, &config.storage).await?;

    let meta = parsed
        .meta
        .ok_or_else(|| ApiError::Validation("Missing \"meta\" part".to_string()))?;
    let submission: DossierSubmission = serde_json::from_slice(&meta)
        .map_err(|e| ApiError::Validation(format!("Invalid form data: {}", e)))?;

    let upload_id = query
        .into_inner()
        .upload_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut response = manager.submit(&upload_id, submission, parsed.files).await?;
    response.rejected_files = parsed.rejected_files;

    Ok(HttpResponse::Created().json(response))
}

pub async fn list_dossiers(
    _session: AdvisorSession,
    db: web::Data<Arc<Database>>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let search = query.into_inner().search;
    let dossiers = db::list_dossiers(db.async_connection.clone(), search.as_deref()).await?;
    let total = dossiers.len();

    Ok(HttpResponse::Ok().json(DossierListResponse { dossiers, total }))
}

pub async fn get_dossier(
    _session: AdvisorSession,
    db: web::Data<Arc<Database>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let detail = find_dossier(&db, &id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn delete_dossier(
    session: AdvisorSession,
    manager: web::Data<Arc<DossierManager>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    match manager.delete(&id).await? {
        Some(response) => {
            tracing::info!("Dossier {} deleted by {}", id, session.email);
            Ok(HttpResponse::Ok().json(response))
        }
        None => Err(not_found(&id)),
    }
}

pub async fn get_attachment(
    _session: AdvisorSession,
    db: web::Data<Arc<Database>>,
    manager: web::Data<Arc<DossierManager>>,
    path: web::Path<(String, usize)>,
) -> Result<HttpResponse, ApiError> {
    let (id, index) = path.into_inner();
    let detail = find_dossier(&db, &id).await?;

    let attachment = detail
        .dossier
        .attachments
        .get(index)
        .ok_or_else(|| ApiError::NotFound(format!("Dossier {} has no attachment {}", id, index)))?;

    let bytes = manager.store().get(&attachment.path).await.map_err(|e| {
        tracing::warn!("Attachment {} unreadable: {:#}", attachment.path, e);
        ApiError::NotFound(format!("Attachment {} is no longer available", attachment.name))
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(attachment_disposition(&attachment.name))
        .body(bytes))
}

/// Store a previously exported document as-is, whatever its layout
pub async fn import_dossier(
    session: AdvisorSession,
    db: web::Data<Arc<Database>>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, ApiError> {
    let document = body.into_inner();
    if !document.is_object() {
        return Err(ApiError::Validation("Expected a JSON object".to_string()));
    }

    let id = uuid::Uuid::new_v4().to_string();
    db::insert_raw_document(db.async_connection.clone(), &id, &document)
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid dossier document: {}", e)))?;

    tracing::info!("Dossier {} imported by {}", id, session.email);
    Ok(HttpResponse::Created().json(serde_json::json!({ "id": id })))
}

pub async fn dossier_pdf(
    _session: AdvisorSession,
    db: web::Data<Arc<Database>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let detail = find_dossier(&db, &id).await?;

    let report = budget::dossier_report(&detail);
    let bytes = web::block(move || pdf::render_report(&report))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(attachment_disposition(&format!("dossier-{}.pdf", id)))
        .body(bytes))
}

/// Zip of the form data and every attachment that can still be read
pub async fn dossier_archive(
    _session: AdvisorSession,
    db: web::Data<Arc<Database>>,
    manager: web::Data<Arc<DossierManager>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let detail = find_dossier(&db, &id).await?;

    let store = manager.store();
    let mut pieces = Vec::new();
    for attachment in &detail.dossier.attachments {
        match store.get(&attachment.path).await {
            Ok(bytes) => pieces.push((attachment.name.clone(), bytes)),
            Err(e) => tracing::warn!(
                "Leaving {} out of the archive of {}: {:#}",
                attachment.path,
                id,
                e
            ),
        }
    }

    let bytes = web::block(move || archive::build_archive(&detail, &pieces))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok()
        .content_type("application/zip")
        .insert_header(attachment_disposition(&format!("dossier-{}.zip", id)))
        .body(bytes))
}

async fn find_dossier(db: &Database, id: &str) -> Result<shared_types::DossierDetail, ApiError> {
    db::get_dossier(db.async_connection.clone(), id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Dossier {} not found", id))
}
