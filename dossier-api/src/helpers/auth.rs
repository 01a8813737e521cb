use crate::config::{AdvisorAccount, AuthConfig};
use crate::handlers::ApiError;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{DateTime, Duration, Utc};
use futures::future::LocalBoxFuture;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

const TOKEN_LENGTH: usize = 48;
const SALT_LENGTH: usize = 16;
const HASH_SCHEME: &str = "sha256";
const HASH_ITERATIONS: u32 = 10_000;

fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn stretch(salt: &str, password: &str, iterations: u32) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..iterations {
        digest = Sha256::new()
            .chain_update(salt.as_bytes())
            .chain_update(digest)
            .finalize();
    }
    hex::encode(digest)
}

/// Salted, iterated SHA-256 of a password, as stored in `auth.advisors`:
/// `sha256$<iterations>$<salt>$<hex digest>`
pub fn hash_password(password: &str) -> String {
    hash_password_with_salt(password, &random_string(SALT_LENGTH), HASH_ITERATIONS)
}

fn hash_password_with_salt(password: &str, salt: &str, iterations: u32) -> String {
    format!(
        "{}${}${}${}",
        HASH_SCHEME,
        iterations,
        salt,
        stretch(salt, password, iterations)
    )
}

/// Check a password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.trim().splitn(4, '$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let iterations = match iterations.parse::<u32>() {
        Ok(n) if n > 0 && scheme == HASH_SCHEME && !salt.is_empty() => n,
        _ => return false,
    };

    let actual = stretch(salt, password, iterations);
    // Compare every byte so timing does not leak the matching prefix
    actual.len() == expected.len()
        && actual
            .bytes()
            .zip(expected.to_ascii_lowercase().bytes())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

#[derive(Clone)]
pub struct Session {
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// In-memory advisor sessions keyed by bearer token
pub struct SessionStore {
    advisors: Vec<AdvisorAccount>,
    ttl: Duration,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            advisors: config.advisors.clone(),
            ttl: Duration::minutes(config.session_ttl_minutes.max(1)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn has_advisors(&self) -> bool {
        !self.advisors.is_empty()
    }

    /// Check credentials and open a session. Returns `None` on a bad email or password.
    pub async fn login(&self, email: &str, password: &str) -> Option<(String, Session)> {
        let email = email.trim();
        let account = self
            .advisors
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .filter(|a| verify_password(password, &a.password_hash))?;

        let token = random_string(TOKEN_LENGTH);
        let session = Session {
            email: account.email.clone(),
            expires_at: Utc::now() + self.ttl,
        };

        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| s.expires_at > Utc::now());
        sessions.insert(token.clone(), session.clone());

        Some((token, session))
    }

    pub async fn validate(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(token) {
            Some(session) if Utc::now() < session.expires_at => Some(session.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub async fn revoke(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(token).is_some()
    }
}

/// An authenticated advisor. Using it as a handler argument makes the route
/// answer 401 without a valid `Authorization: Bearer` token.
pub struct AdvisorSession {
    pub token: String,
    pub email: String,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get("Authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl FromRequest for AdvisorSession {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let store = req.app_data::<web::Data<Arc<SessionStore>>>().cloned();

        Box::pin(async move {
            let store = store
                .ok_or_else(|| ApiError::Internal("Session store is not configured".to_string()))?;
            let token =
                token.ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

            match store.validate(&token).await {
                Some(session) => Ok(AdvisorSession {
                    token,
                    email: session.email,
                }),
                None => Err(ApiError::Unauthorized(
                    "Session expired or invalid".to_string(),
                )),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ttl_minutes: i64) -> SessionStore {
        SessionStore::new(&AuthConfig {
            session_ttl_minutes: ttl_minutes,
            advisors: vec![AdvisorAccount {
                email: "conseil@cresus.org".to_string(),
                password_hash: hash_password("s3cret"),
            }],
        })
    }

    #[test]
    fn test_hash_password() {
        // One round is plain SHA-256 over salt then password
        assert_eq!(
            hash_password_with_salt("c", "ab", 1),
            "sha256$1$ab$ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        let first = hash_password("s3cret");
        let second = hash_password("s3cret");
        assert!(first.starts_with("sha256$10000$"));
        assert_ne!(first, second);
        assert!(verify_password("s3cret", &first));
        assert!(verify_password("s3cret", &second));
        assert!(!verify_password("S3cret", &first));
    }

    #[test]
    fn test_verify_rejects_malformed_hashes() {
        let unsalted = hex::encode(Sha256::digest(b"s3cret"));
        assert!(!verify_password("s3cret", &unsalted));
        assert!(!verify_password("s3cret", ""));
        assert!(!verify_password("s3cret", "sha256$0$ab$00"));
        assert!(!verify_password("s3cret", "md5$1$ab$00"));
        assert!(!verify_password("s3cret", "sha256$1$$00"));
    }

    #[tokio::test]
    async fn test_login_validate_revoke() {
        let store = store(60);
        assert!(store.login("conseil@cresus.org", "wrong").await.is_none());
        assert!(store.login("autre@cresus.org", "s3cret").await.is_none());

        let (token, session) = store.login(" Conseil@Cresus.org ", "s3cret").await.unwrap();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert_eq!(session.email, "conseil@cresus.org");

        assert!(store.validate(&token).await.is_some());
        assert!(store.revoke(&token).await);
        assert!(store.validate(&token).await.is_none());
        assert!(!store.revoke(&token).await);
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let store = store(60);
        let (token, _) = store.login("conseil@cresus.org", "s3cret").await.unwrap();
        {
            let mut sessions = store.sessions.lock().await;
            if let Some(session) = sessions.get_mut(&token) {
                session.expires_at = Utc::now() - Duration::seconds(1);
            }
        }
        assert!(store.validate(&token).await.is_none());
    }

    #[test]
    fn test_bearer_token() {
        let req = actix_web::test::TestRequest::default()
            .insert_header(("Authorization", "Bearer abc123"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc123"));

        let req = actix_web::test::TestRequest::default()
            .insert_header(("Authorization", "Basic abc123"))
            .to_http_request();
        assert!(bearer_token(&req).is_none());
    }

    #[actix_web::test]
    async fn test_extractor_rejects_with_json() {
        use actix_web::{test, App, HttpResponse};

        let sessions = Arc::new(store(60));
        let app = test::init_service(
            App::new().app_data(web::Data::new(sessions)).route(
                "/private",
                web::get().to(|session: AdvisorSession| async move {
                    HttpResponse::Ok().body(session.email)
                }),
            ),
        )
        .await;

        for auth in [None, Some("Bearer not-a-session")] {
            let mut req = test::TestRequest::get().uri("/private");
            if let Some(value) = auth {
                req = req.insert_header(("Authorization", value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert!(body["error"].is_string(), "unexpected body {body}");
        }
    }

    #[actix_web::test]
    async fn test_extractor_without_store_is_internal_error() {
        use actix_web::{test, App, HttpResponse};

        let app = test::init_service(App::new().route(
            "/private",
            web::get().to(|_session: AdvisorSession| async { HttpResponse::Ok().finish() }),
        ))
        .await;
        let req = test::TestRequest::get()
            .uri("/private")
            .insert_header(("Authorization", "Bearer abc"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Session store is not configured");
    }
}
