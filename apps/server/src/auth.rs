//! # Authentication & Sessions
//!
//! Password verification, the in-memory session store, and the auth
//! middleware layers.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │  POST /api/auth/login {username, password}                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  users table ──► argon2 verify ──► SessionStore.create()                │
//! │                       │                     │                           │
//! │                       │ mismatch            ▼                           │
//! │                       ▼              {token: UUID, user}                │
//! │                  401 UNAUTHORIZED                                       │
//! │                                                                         │
//! │  Authorization: Bearer <token>                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  require_auth ──► SessionStore.resolve() ──► CurrentUser in extensions  │
//! │                                                                         │
//! │  POST /api/auth/logout ──► SessionStore.remove() ──► token invalid      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sessions are held in memory only. A server restart logs everyone out,
//! which is acceptable for a single-store deployment.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use stylestock_core::{User, UserRole};
use stylestock_db::Database;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::routes::AppState;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Current User
// =============================================================================

/// The authenticated identity attached to a request.
///
/// Injected into request extensions by [`require_auth`] and read by handlers
/// via `Extension<CurrentUser>`. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: UserRole,
}

impl CurrentUser {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        CurrentUser {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
        }
    }
}

/// The raw bearer token of the current request.
///
/// Stored alongside [`CurrentUser`] so the logout handler can invalidate
/// the exact session that made the call.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

// =============================================================================
// Session Store
// =============================================================================

/// A server-held record of an authenticated user, addressed by an opaque
/// bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: CurrentUser,
    pub created_at: DateTime<Utc>,
}

/// In-memory session store.
///
/// Tokens are random UUIDs; there is nothing to decode on the client side.
/// Logout removes the entry, so a logged-out token fails `resolve` even if
/// the client keeps presenting it.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Creates an empty session store.
    pub fn new() -> Self {
        SessionStore {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Mints a new session for a verified user.
    ///
    /// Credential verification happens before this call; the store only
    /// issues tokens.
    pub async fn create(&self, user: &User) -> Session {
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user: CurrentUser::from(user),
            created_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Resolves a bearer token to its user, if the session exists.
    pub async fn resolve(&self, token: &str) -> Option<CurrentUser> {
        let sessions = self.sessions.read().await;
        sessions.get(token).map(|s| s.user.clone())
    }

    /// Removes a session. Returns `false` if the token was not active.
    pub async fn remove(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token).is_some()
    }

    /// Number of active sessions.
    pub async fn count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new()
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Require authentication middleware.
///
/// Extracts the bearer token from the Authorization header and resolves it
/// against the session store. On success the [`CurrentUser`] is added to the
/// request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path();

    // Allow OPTIONS requests for CORS preflight (skip auth)
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Skip auth for non-API routes (let them return 404 normally)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // Skip auth for public API routes
    if path == "/api/auth/login" {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(extract_bearer_token) {
        Some(token) => token.to_string(),
        None => {
            tracing::warn!(uri = %req.uri(), "Request without bearer token");
            return Err(ApiError::unauthorized("Missing bearer token"));
        }
    };

    match state.sessions.resolve(&token).await {
        Some(user) => {
            tracing::debug!(
                username = %user.username,
                role = ?user.role,
                "Session resolved"
            );
            req.extensions_mut().insert(SessionToken(token));
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        None => {
            tracing::warn!(uri = %req.uri(), "Unknown or expired session token");
            Err(ApiError::unauthorized("Invalid or expired session token"))
        }
    }
}

/// Require admin role middleware.
///
/// Layered on top of [`require_auth`], so the [`CurrentUser`] extension is
/// already present for authenticated requests.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    if !user.is_admin() {
        tracing::warn!(
            username = %user.username,
            role = ?user.role,
            "Admin route denied"
        );
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(req).await)
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Account Bootstrap
// =============================================================================

/// Creates the default `admin` and `seller` accounts when the users table
/// is empty.
///
/// Passwords come from configuration ([`ServerConfig::admin_password`] /
/// [`ServerConfig::seller_password`]); nothing is baked into the binary.
/// Subsequent startups see a non-empty table and skip this entirely.
pub async fn bootstrap_users(db: &Database, config: &ServerConfig) -> Result<(), ApiError> {
    let users = db.users();

    if users.count().await? > 0 {
        return Ok(());
    }

    tracing::info!("No user accounts found - bootstrapping defaults");

    let accounts = [
        ("admin", "Administrator", UserRole::Admin, &config.admin_password),
        ("seller", "Seller", UserRole::Seller, &config.seller_password),
    ];

    for (username, display_name, role, password) in accounts {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
            display_name: display_name.to_string(),
            role,
            created_at: Utc::now(),
        };
        users.insert(&user).await?;
        tracing::info!(username, role = ?role, "Bootstrapped account");
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stylestock_db::DbConfig;

    fn test_config() -> ServerConfig {
        ServerConfig {
            http_port: 0,
            bind_addr: "127.0.0.1".to_string(),
            db_path: ":memory:".to_string(),
            admin_password: "correct-horse".to_string(),
            seller_password: "battery-staple".to_string(),
            ai_api_key: None,
            ai_model: "claude-sonnet-4-20250514".to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-hash"));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc-123"), Some("abc-123"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc-123"), None);
        assert_eq!(extract_bearer_token("abc-123"), None);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::new();
        let user = User {
            id: "u-1".to_string(),
            username: "admin".to_string(),
            password_hash: "$argon2id$irrelevant".to_string(),
            display_name: "Administrator".to_string(),
            role: UserRole::Admin,
            created_at: Utc::now(),
        };

        let session = store.create(&user).await;
        assert_eq!(store.count().await, 1);

        let resolved = store.resolve(&session.token).await.unwrap();
        assert_eq!(resolved.username, "admin");
        assert!(resolved.is_admin());

        assert!(store.remove(&session.token).await);
        assert!(store.resolve(&session.token).await.is_none());
        assert!(!store.remove(&session.token).await);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_token_does_not_resolve() {
        let store = SessionStore::new();
        assert!(store.resolve("no-such-token").await.is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_creates_default_accounts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = test_config();

        bootstrap_users(&db, &config).await.unwrap();

        assert_eq!(db.users().count().await.unwrap(), 2);

        let admin = db.users().get_by_username("admin").await.unwrap().unwrap();
        assert!(admin.is_admin());
        assert!(verify_password("correct-horse", &admin.password_hash));
        assert!(!verify_password("battery-staple", &admin.password_hash));

        let seller = db.users().get_by_username("seller").await.unwrap().unwrap();
        assert_eq!(seller.role, UserRole::Seller);
    }

    #[tokio::test]
    async fn test_bootstrap_skips_populated_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = test_config();

        bootstrap_users(&db, &config).await.unwrap();
        bootstrap_users(&db, &config).await.unwrap();

        assert_eq!(db.users().count().await.unwrap(), 2);
    }
}
