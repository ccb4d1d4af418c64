// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth client for sign-in and calendar token management.
//!
//! Handles:
//! - Building the consent URL (profile + calendar scopes, offline access)
//! - Authorization-code exchange
//! - Access-token refresh
//! - ID token claim extraction

use crate::error::AppError;
use crate::models::GoogleIdentity;
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const SCOPES: &str = "openid email profile \
                      https://www.googleapis.com/auth/calendar \
                      https://www.googleapis.com/auth/calendar.events";

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleAuthClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl GoogleAuthClient {
    /// Create a new OAuth client with application credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: TOKEN_URL.to_string(),
            client_id,
            client_secret,
        }
    }

    /// Override the token endpoint (tests only).
    pub fn with_token_url(mut self, token_url: String) -> Self {
        self.token_url = token_url;
        self
    }

    /// Build the consent URL for sign-in (and calendar re-consent).
    ///
    /// `access_type=offline` + `prompt=consent` so Google issues a refresh
    /// token along with the access token.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            AUTHORIZE_URL,
            self.client_id,
            urlencoding::encode(redirect_uri),
            urlencoding::encode(SCOPES),
            state
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::CalendarApi(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Failed to parse token response: {}", e)))
    }

    /// Refresh an access token using the stored refresh token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::CalendarApi(format!(
                "Failed to refresh token: {}",
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::CalendarApi(format!("Failed to parse token response: {}", e)))
    }

    /// Extract identity claims from the ID token returned by the token
    /// endpoint.
    ///
    /// The token was received directly from Google over TLS in the same
    /// exchange, so the signature is not re-verified here.
    pub fn decode_identity(id_token: &str) -> Result<GoogleIdentity, AppError> {
        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<IdTokenClaims>(id_token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| AppError::CalendarApi(format!("Invalid ID token: {}", e)))?;

        let claims = data.claims;
        Ok(GoogleIdentity {
            uid: claims.sub,
            email: claims.email,
            display_name: claims.name,
            photo_url: claims.picture,
            email_verified: claims.email_verified.unwrap_or(false),
        })
    }
}

/// ID token claims we care about.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

/// Authorization-code exchange response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub id_token: String,
}

/// Token refresh response, also served by `POST /api/auth/refresh-token`.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_includes_calendar_scopes() {
        let client = GoogleAuthClient::new("cid".to_string(), "secret".to_string());
        let url = client.authorize_url("http://localhost:8080/auth/google/callback", "state123");

        assert!(url.contains("client_id=cid"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains(&urlencoding::encode(
            "https://www.googleapis.com/auth/calendar"
        ).to_string()));
        assert!(url.contains("state=state123"));
    }

    #[test]
    fn test_decode_identity() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            r#"{"sub":"uid-123","email":"pat@example.com","email_verified":true,"name":"Pat","picture":"https://example.com/p.jpg"}"#,
        );
        let token = format!("{}.{}.{}", header, payload, URL_SAFE_NO_PAD.encode("sig"));

        let identity = GoogleAuthClient::decode_identity(&token).expect("decodes");
        assert_eq!(identity.uid, "uid-123");
        assert_eq!(identity.email.as_deref(), Some("pat@example.com"));
        assert!(identity.email_verified);
    }
}
