use actix_web::{web, HttpResponse};
use shared_types::{LoginRequest, LoginResponse};
use std::sync::Arc;

use super::ApiError;
use crate::helpers::auth::{AdvisorSession, SessionStore};

pub async fn login(
    sessions: web::Data<Arc<SessionStore>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = request.into_inner();

    match sessions.login(&req.email, &req.password).await {
        Some((token, session)) => {
            tracing::info!("Advisor {} logged in", session.email);
            Ok(HttpResponse::Ok().json(LoginResponse {
                token,
                email: session.email,
                expires_at: session.expires_at.timestamp(),
            }))
        }
        None => {
            tracing::warn!("Failed login attempt for {}", req.email.trim());
            Err(ApiError::InvalidCredentials)
        }
    }
}

pub async fn logout(
    sessions: web::Data<Arc<SessionStore>>,
    session: AdvisorSession,
) -> Result<HttpResponse, ApiError> {
    sessions.revoke(&session.token).await;
    tracing::info!("Advisor {} logged out", session.email);
    Ok(HttpResponse::NoContent().finish())
}
