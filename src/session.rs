//! Authentication and session persistence
//!
//! Sign-in state lives in a small JSON file under the platform data
//! directory, so `chat` and `ask` can attach a bearer token without the
//! user logging in every run. Roles are taken from the `role` claim of
//! the access token rather than inferred from the account name; an
//! expired session is treated as logged out on load.

use crate::config::ApiConfig;
use crate::error::{Result, UniqaError};
use crate::service::extract_detail;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Role granted to an account by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Student,
}

impl UserRole {
    /// Return the wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Student => "student",
        }
    }

    /// Parse a role name as supplied on the command line
    ///
    /// # Errors
    ///
    /// Returns error if the value is not a known role
    pub fn parse_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "student" => Ok(UserRole::Student),
            other => Err(UniqaError::Config(format!("Unknown role: {}", other)).into()),
        }
    }

    /// Derive the role from the token's `role` claim
    ///
    /// Anything other than an explicit `admin` claim is treated as a
    /// student account.
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim {
            Some(value) if value.eq_ignore_ascii_case("admin") => UserRole::Admin,
            _ => UserRole::Student,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Claims carried in the access token payload
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Decode the payload segment of a JWT without verifying its signature
///
/// The client trusts transport security for integrity; this only reads
/// the claims the service put there.
fn decode_claims(token: &str) -> Result<TokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| UniqaError::Auth("Access token is not a JWT".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| UniqaError::Auth(format!("Failed to decode token payload: {}", e)))?;
    let claims = serde_json::from_slice(&bytes)
        .map_err(|e| UniqaError::Auth(format!("Failed to parse token payload: {}", e)))?;
    Ok(claims)
}

/// A signed-in account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the access token's expiry has passed
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => at <= Utc::now(),
            None => false,
        }
    }
}

/// Persistent storage for the current session
///
/// The session file location can be overridden with the
/// `UNIQA_SESSION_FILE` environment variable; otherwise it lives under
/// the platform data directory.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store at the default (or overridden) location
    ///
    /// # Errors
    ///
    /// Returns error if the platform data directory cannot be determined
    pub fn new() -> Result<Self> {
        if let Ok(path) = std::env::var("UNIQA_SESSION_FILE") {
            tracing::debug!("Using session file from UNIQA_SESSION_FILE: {}", path);
            return Ok(Self {
                path: PathBuf::from(path),
            });
        }

        let dirs = ProjectDirs::from("com", "uniqa", "uniqa").ok_or_else(|| {
            UniqaError::Session("Could not determine data directory".to_string())
        })?;
        Ok(Self {
            path: dirs.data_dir().join("session.json"),
        })
    }

    /// Create a store backed by a specific file
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current session, if one is stored and still valid
    ///
    /// Returns `Ok(None)` when no session file exists or the stored
    /// session has expired.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| UniqaError::Session(format!("Failed to read session file: {}", e)))?;
        let session: Session = serde_json::from_str(&contents)
            .map_err(|e| UniqaError::Session(format!("Failed to parse session file: {}", e)))?;

        if session.is_expired() {
            tracing::debug!("Stored session has expired; treating as logged out");
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Persist a session, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                UniqaError::Session(format!("Failed to create session directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents)
            .map_err(|e| UniqaError::Session(format!("Failed to write session file: {}", e)))?;

        tracing::debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    /// Remove the stored session; succeeds when none exists
    ///
    /// # Errors
    ///
    /// Returns error if an existing file cannot be removed
    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| UniqaError::Session(format!("Failed to remove session file: {}", e)))?;
        }
        Ok(())
    }
}

/// Response body from the login endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Request body for the register endpoint
#[derive(Debug, Serialize)]
struct RegisterRequest {
    email: String,
    password: String,
    role: String,
}

/// HTTP client for the authentication endpoints
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a new client for the configured service
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("uniqa/0.1.0")
            .build()
            .map_err(|e| UniqaError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange credentials for a session
    ///
    /// The login endpoint expects form-encoded `username`/`password`
    /// fields and returns a bearer token; role and expiry are read from
    /// the token's claims.
    ///
    /// # Errors
    ///
    /// Returns `UniqaError::Auth` when the credentials are rejected or
    /// the returned token cannot be decoded, and `UniqaError::Network`
    /// when the endpoint is unreachable.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/login", self.base_url);
        tracing::debug!("Logging in as {}", email);

        let response = self
            .client
            .post(&url)
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach auth endpoint: {}", e);
                UniqaError::Network(format!("Failed to reach auth endpoint: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match extract_detail(&body) {
                Some(detail) => detail,
                None if body.trim().is_empty() => "Login failed".to_string(),
                None => body,
            };
            tracing::error!("Auth endpoint returned {}: {}", status, message);
            return Err(UniqaError::Auth(message).into());
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse login response: {}", e);
            UniqaError::MalformedResponse(format!("Failed to parse login response: {}", e))
        })?;

        let claims = decode_claims(&token.access_token)?;
        let role = UserRole::from_claim(claims.role.as_deref());
        let expires_at = claims.exp.and_then(|secs| DateTime::from_timestamp(secs, 0));

        tracing::info!("Logged in as {} ({})", email, role);

        Ok(Session {
            access_token: token.access_token,
            email: claims.sub.unwrap_or_else(|| email.to_string()),
            role,
            expires_at,
        })
    }

    /// Create an account, then log in with the same credentials
    ///
    /// # Errors
    ///
    /// Returns `UniqaError::Auth` when registration is rejected, plus
    /// any error the follow-up login can produce.
    pub async fn register(&self, email: &str, password: &str, role: UserRole) -> Result<Session> {
        let url = format!("{}/auth/register", self.base_url);
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            role: role.as_str().to_string(),
        };

        tracing::debug!("Registering {} as {}", email, role);

        let response = self.client.post(&url).json(&request).send().await.map_err(|e| {
            tracing::error!("Failed to reach auth endpoint: {}", e);
            UniqaError::Network(format!("Failed to reach auth endpoint: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match extract_detail(&body) {
                Some(detail) => detail,
                None if body.trim().is_empty() => "Registration failed".to_string(),
                None => body,
            };
            tracing::error!("Auth endpoint returned {}: {}", status, message);
            return Err(UniqaError::Auth(message).into());
        }

        // The register endpoint echoes the created account; the token
        // still comes from a normal login.
        self.login(email, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use tempfile::TempDir;

    fn make_token(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.signature", header, payload)
    }

    fn create_test_store() -> (SessionStore, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let store = SessionStore::with_path(dir.path().join("session.json"));
        (store, dir)
    }

    fn sample_session() -> Session {
        Session {
            access_token: "tok".to_string(),
            email: "student@uni.edu".to_string(),
            role: UserRole::Student,
            expires_at: None,
        }
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::Student.as_str(), "student");
    }

    #[test]
    fn test_role_parse_str_accepts_known_roles() {
        assert_eq!(UserRole::parse_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::parse_str("Student").unwrap(), UserRole::Student);
    }

    #[test]
    fn test_role_parse_str_rejects_unknown_role() {
        let result = UserRole::parse_str("professor");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown role"));
    }

    #[test]
    fn test_role_from_claim() {
        assert_eq!(UserRole::from_claim(Some("admin")), UserRole::Admin);
        assert_eq!(UserRole::from_claim(Some("Admin")), UserRole::Admin);
        assert_eq!(UserRole::from_claim(Some("student")), UserRole::Student);
        assert_eq!(UserRole::from_claim(Some("anything")), UserRole::Student);
        assert_eq!(UserRole::from_claim(None), UserRole::Student);
    }

    #[test]
    fn test_decode_claims_reads_payload() {
        let token = make_token(json!({
            "sub": "admin@uni.edu",
            "role": "admin",
            "exp": 4_102_444_800i64,
        }));
        let claims = decode_claims(&token).expect("decode failed");
        assert_eq!(claims.sub.as_deref(), Some("admin@uni.edu"));
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert_eq!(claims.exp, Some(4_102_444_800));
    }

    #[test]
    fn test_decode_claims_tolerates_missing_fields() {
        let token = make_token(json!({"sub": "x@uni.edu"}));
        let claims = decode_claims(&token).expect("decode failed");
        assert!(claims.role.is_none());
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_decode_claims_rejects_opaque_token() {
        let result = decode_claims("not-a-jwt");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a JWT"));
    }

    #[test]
    fn test_decode_claims_rejects_invalid_payload() {
        let result = decode_claims("header.!!!.signature");
        assert!(result.is_err());
    }

    #[test]
    fn test_session_without_expiry_never_expires() {
        assert!(!sample_session().is_expired());
    }

    #[test]
    fn test_session_expiry_comparison() {
        let mut session = sample_session();
        session.expires_at = Some(Utc::now() + chrono::Duration::hours(1));
        assert!(!session.is_expired());
        session.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
        assert!(session.is_expired());
    }

    #[test]
    fn test_store_load_returns_none_when_missing() {
        let (store, _dir) = create_test_store();
        assert!(store.load().expect("load failed").is_none());
    }

    #[test]
    fn test_store_save_and_load_round_trip() {
        let (store, _dir) = create_test_store();
        let session = sample_session();
        store.save(&session).expect("save failed");

        let loaded = store.load().expect("load failed").expect("no session");
        assert_eq!(loaded.access_token, "tok");
        assert_eq!(loaded.email, "student@uni.edu");
        assert_eq!(loaded.role, UserRole::Student);
    }

    #[test]
    fn test_store_load_returns_none_for_expired_session() {
        let (store, _dir) = create_test_store();
        let mut session = sample_session();
        session.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
        store.save(&session).expect("save failed");

        assert!(store.load().expect("load failed").is_none());
    }

    #[test]
    fn test_store_delete_is_idempotent() {
        let (store, _dir) = create_test_store();
        store.save(&sample_session()).expect("save failed");
        store.delete().expect("first delete failed");
        store.delete().expect("second delete failed");
        assert!(store.load().expect("load failed").is_none());
    }

    #[test]
    #[serial]
    fn test_new_honors_session_file_env_var() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let path = dir.path().join("custom-session.json");
        std::env::set_var("UNIQA_SESSION_FILE", &path);

        let store = SessionStore::new().expect("store creation failed");
        assert_eq!(store.path(), path.as_path());

        std::env::remove_var("UNIQA_SESSION_FILE");
    }
}
