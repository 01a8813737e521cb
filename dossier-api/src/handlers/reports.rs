use actix_web::{web, HttpResponse};
use shared_types::ReportSnapshot;

use super::{attachment_disposition, ApiError};
use crate::helpers::auth::AdvisorSession;
use crate::helpers::pdf;

const SNAPSHOT_FILE_NAME: &str = "dossier-CRESUS.pdf";

/// Render the fixed one-page template from a form snapshot
pub async fn snapshot_pdf(
    _session: AdvisorSession,
    snapshot: web::Json<ReportSnapshot>,
) -> Result<HttpResponse, ApiError> {
    let report = budget::snapshot_report(&snapshot.into_inner());
    let bytes = web::block(move || pdf::render_report(&report))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(attachment_disposition(SNAPSHOT_FILE_NAME))
        .body(bytes))
}
