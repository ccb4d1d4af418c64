// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Company profile and logo upload routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::CompanyInfo;
use crate::services::company::CompanyInfoPatch;
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Body limit for logo uploads: the 5 MB logo ceiling plus multipart
/// framing overhead.
const LOGO_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/company", get(get_company).put(update_company))
        .route(
            "/api/company/logo",
            post(upload_logo)
                .delete(delete_logo)
                .layer(DefaultBodyLimit::max(LOGO_BODY_LIMIT)),
        )
}

/// Get the company profile (default when none has been saved).
async fn get_company(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CompanyInfo>> {
    let info = state.company_service.get_company_info(&user.uid).await?;
    Ok(Json(info))
}

/// Merge updates into the company profile.
async fn update_company(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<CompanyInfoPatch>,
) -> Result<Json<CompanyInfo>> {
    let info = state
        .company_service
        .update_company_info(&user.uid, patch)
        .await?;
    Ok(Json(info))
}

/// Response for a logo upload.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogoResponse {
    pub logo_url: String,
}

/// Upload a logo from a multipart form (field name "logo").
async fn upload_logo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<LogoResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("logo") {
            continue;
        }

        let filename = field.file_name().unwrap_or("logo").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let logo_url = state
            .company_service
            .upload_logo(&user.uid, &filename, &content_type, bytes.to_vec())
            .await?;

        return Ok(Json(LogoResponse { logo_url }));
    }

    Err(AppError::BadRequest("Missing 'logo' field".to_string()))
}

/// Response for logo deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteLogoResponse {
    pub success: bool,
}

/// Delete the stored logo and clear the URL field.
async fn delete_logo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteLogoResponse>> {
    state.company_service.delete_logo(&user.uid).await?;
    Ok(Json(DeleteLogoResponse { success: true }))
}
