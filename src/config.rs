//! Application configuration loaded from environment variables.
//!
//! All settings are read once at startup. The Firebase values mirror the
//! web app's `NEXT_PUBLIC_FIREBASE_*` configuration and are validated by
//! the standalone `check_setup` binary.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Firebase platform settings ---
    /// Firebase web API key (public)
    pub firebase_api_key: String,
    /// Firebase auth domain
    pub firebase_auth_domain: String,
    /// Firebase/GCP project ID (also used for Firestore)
    pub firebase_project_id: String,
    /// Cloud Storage bucket for logo uploads
    pub firebase_storage_bucket: String,
    /// Firebase messaging sender ID
    pub firebase_messaging_sender_id: String,
    /// Firebase app ID
    pub firebase_app_id: String,

    // --- Google OAuth (sign-in + calendar scopes) ---
    /// OAuth client ID (public)
    pub google_client_id: String,
    /// OAuth client secret
    pub google_client_secret: String,

    // --- Server settings ---
    /// Frontend URL for OAuth redirects
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for signing the OAuth state parameter
    pub oauth_state_key: Vec<u8>,
}

/// Environment variables required for the Firebase platform connection.
///
/// Checked by `check_setup` for missing or placeholder values.
pub const REQUIRED_FIREBASE_VARS: [&str; 6] = [
    "FIREBASE_API_KEY",
    "FIREBASE_AUTH_DOMAIN",
    "FIREBASE_PROJECT_ID",
    "FIREBASE_STORAGE_BUCKET",
    "FIREBASE_MESSAGING_SENDER_ID",
    "FIREBASE_APP_ID",
];

/// True when a value is absent or still a template placeholder.
pub fn is_placeholder(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.trim().is_empty() || v.contains("your_"),
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            firebase_auth_domain: env::var("FIREBASE_AUTH_DOMAIN")
                .map_err(|_| ConfigError::Missing("FIREBASE_AUTH_DOMAIN"))?,
            firebase_project_id: env::var("FIREBASE_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("FIREBASE_PROJECT_ID"))?,
            firebase_storage_bucket: env::var("FIREBASE_STORAGE_BUCKET")
                .map_err(|_| ConfigError::Missing("FIREBASE_STORAGE_BUCKET"))?,
            firebase_messaging_sender_id: env::var("FIREBASE_MESSAGING_SENDER_ID")
                .unwrap_or_default(),
            firebase_app_id: env::var("FIREBASE_APP_ID").unwrap_or_default(),

            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,

            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            firebase_api_key: "test_api_key".to_string(),
            firebase_auth_domain: "test-project.firebaseapp.com".to_string(),
            firebase_project_id: "test-project".to_string(),
            firebase_storage_bucket: "test-project.appspot.com".to_string(),
            firebase_messaging_sender_id: "000000000000".to_string(),
            firebase_app_id: "1:000000000000:web:testapp".to_string(),
            google_client_id: "test_client_id".to_string(),
            google_client_secret: "test_secret".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_state_key".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
