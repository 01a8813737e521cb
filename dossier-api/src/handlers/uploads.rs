use actix_web::{web, HttpResponse};
use std::sync::Arc;

use super::ApiError;
use crate::jobs::dossier_manager::DossierManager;

/// Progress of a running (or recently finished) submission
pub async fn get_upload_progress(
    manager: web::Data<Arc<DossierManager>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let upload_id = path.into_inner();

    manager
        .tracker()
        .get(&upload_id)
        .map(|progress| HttpResponse::Ok().json(progress))
        .ok_or_else(|| ApiError::NotFound(format!("Unknown upload {}", upload_id)))
}
