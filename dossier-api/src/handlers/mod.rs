pub mod auth;
pub mod dossiers;
pub mod reports;
pub mod uploads;

use crate::jobs::dossier_manager::SubmissionError;
use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!("Request failed: {:#}", e);
        ApiError::Internal(e.to_string())
    }
}

impl From<SubmissionError> for ApiError {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::Invalid(e) => ApiError::Validation(e.to_string()),
            SubmissionError::Storage(e) => e.into(),
        }
    }
}

/// Register every API route. Shared by the binary and the HTTP tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/auth/login", web::post().to(auth::login))
        .route("/api/auth/logout", web::post().to(auth::logout))
        .route("/api/dossiers", web::post().to(dossiers::submit_dossier))
        .route("/api/dossiers", web::get().to(dossiers::list_dossiers))
        .route("/api/dossiers/import", web::post().to(dossiers::import_dossier))
        .route("/api/dossiers/{id}", web::get().to(dossiers::get_dossier))
        .route("/api/dossiers/{id}", web::delete().to(dossiers::delete_dossier))
        .route("/api/dossiers/{id}/pdf", web::get().to(dossiers::dossier_pdf))
        .route("/api/dossiers/{id}/archive", web::get().to(dossiers::dossier_archive))
        .route(
            "/api/dossiers/{id}/attachments/{index}",
            web::get().to(dossiers::get_attachment),
        )
        .route("/api/uploads/{upload_id}", web::get().to(uploads::get_upload_progress))
        .route("/api/reports/pdf", web::post().to(reports::snapshot_pdf));
}

async fn health(db: web::Data<std::sync::Arc<crate::database::Database>>) -> HttpResponse {
    match db.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(e) => {
            tracing::warn!("Health check failed: {:#}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected"
            }))
        }
    }
}

/// `attachment; filename="..."` header value
pub(crate) fn attachment_disposition(file_name: &str) -> (&'static str, String) {
    (
        "Content-Disposition",
        format!(
            "attachment; filename=\"{}\"",
            crate::storage::sanitize_file_name(file_name)
        ),
    )
}
