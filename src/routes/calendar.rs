// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar integration routes.
//!
//! Thin proxies over the calendar service; event data is never cached
//! server-side.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::CalendarRef;
use crate::services::calendar::{CalendarEvent, EventPayload};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/calendar/connect", post(connect))
        .route("/api/calendar/disconnect", post(disconnect))
        .route("/api/calendar/list", get(list_calendars))
        .route(
            "/api/calendar/{calendar_id}/events",
            get(list_events).post(create_event),
        )
        .route(
            "/api/calendar/{calendar_id}/events/{event_id}",
            put(update_event).delete(delete_event),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectRequest {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Generic success response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarActionResponse {
    pub success: bool,
}

/// Store calendar tokens obtained from an OAuth consent.
async fn connect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ConnectRequest>,
) -> Result<Json<CalendarActionResponse>> {
    state
        .calendar_service
        .connect(
            &user.uid,
            &body.access_token,
            body.refresh_token.as_deref(),
            body.expires_in,
        )
        .await?;
    Ok(Json(CalendarActionResponse { success: true }))
}

/// Clear stored tokens and the cached calendar list.
async fn disconnect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CalendarActionResponse>> {
    state.calendar_service.disconnect(&user.uid).await?;
    Ok(Json(CalendarActionResponse { success: true }))
}

/// List calendars (also refreshes the cached list on the profile).
async fn list_calendars(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<CalendarRef>>> {
    let calendars = state.calendar_service.list_calendars(&user.uid).await?;
    Ok(Json(calendars))
}

#[derive(Deserialize)]
struct EventsQuery {
    #[serde(rename = "timeMin")]
    time_min: Option<String>,
    #[serde(rename = "timeMax")]
    time_max: Option<String>,
}

/// List events from one calendar.
async fn list_events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(calendar_id): Path<String>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<CalendarEvent>>> {
    let events = state
        .calendar_service
        .list_events(
            &user.uid,
            &calendar_id,
            query.time_min.as_deref(),
            query.time_max.as_deref(),
        )
        .await?;
    Ok(Json(events))
}

/// Create an event.
async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(calendar_id): Path<String>,
    Json(event): Json<EventPayload>,
) -> Result<Json<CalendarEvent>> {
    let created = state
        .calendar_service
        .create_event(&user.uid, &calendar_id, &event)
        .await?;
    Ok(Json(created))
}

/// Update an event.
async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((calendar_id, event_id)): Path<(String, String)>,
    Json(event): Json<EventPayload>,
) -> Result<Json<CalendarEvent>> {
    let updated = state
        .calendar_service
        .update_event(&user.uid, &calendar_id, &event_id, &event)
        .await?;
    Ok(Json(updated))
}

/// Delete an event.
async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((calendar_id, event_id)): Path<(String, String)>,
) -> Result<Json<CalendarActionResponse>> {
    state
        .calendar_service
        .delete_event(&user.uid, &calendar_id, &event_id)
        .await?;
    Ok(Json(CalendarActionResponse { success: true }))
}
