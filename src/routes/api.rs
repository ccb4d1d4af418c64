// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::CalendarRef;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Profile routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

/// Current user response.
///
/// The calendar tokens never leave the server; only connection metadata
/// is exposed.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
    pub role: String,
    pub is_active: bool,
    pub login_count: u32,
    pub calendar: CalendarStatus,
}

/// Calendar connection metadata.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarStatus {
    pub is_connected: bool,
    pub last_sync: Option<String>,
    pub calendars: Vec<CalendarRef>,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state.session_service.get_profile(&user.uid).await?;

    Ok(Json(UserResponse {
        uid: profile.uid,
        email: profile.email,
        display_name: profile.display_name,
        photo_url: profile.photo_url,
        role: profile.role,
        is_active: profile.is_active,
        login_count: profile.metadata.login_count,
        calendar: CalendarStatus {
            is_connected: profile.calendar.is_connected,
            last_sync: profile.calendar.last_sync,
            calendars: profile.calendar.calendars,
        },
    }))
}
