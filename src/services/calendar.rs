// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Calendar integration: token lifecycle and event CRUD.
//!
//! Handles:
//! - Storing OAuth tokens on the user's calendar link at connect time
//! - Proactive access-token refresh (5-minute margin before expiry)
//! - Calendar-list and event reads, event create/update/delete
//!
//! Tokens live entirely in the persisted [`CalendarLink`]; there is no
//! in-memory cache and no locking around refresh. Concurrent calls may
//! each refresh independently; refreshes are idempotent at the provider.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{CalendarLink, CalendarRef, UserProfile};
use crate::services::google_auth::GoogleAuthClient;
use crate::time_utils::{format_utc_rfc3339, parse_rfc3339};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Default calendar color when Google does not report one.
const DEFAULT_CALENDAR_COLOR: &str = "#4285f4";

/// Expiry assumed when the provider did not say how long the access token
/// lives (1 hour).
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

// ─────────────────────────────────────────────────────────────────────────────
// Calendar API wire types
// ─────────────────────────────────────────────────────────────────────────────

/// An event as returned by the Google Calendar API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<EventAttendee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<EventOrganizer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
}

/// Event start/end: either a timed instant or an all-day date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOrganizer {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Event fields accepted for create/update (id and audit fields are
/// assigned by Google).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<EventAttendee>,
}

#[derive(Debug, Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<RawCalendarListItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCalendarListItem {
    id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    background_color: Option<String>,
    #[serde(default)]
    primary: Option<bool>,
    #[serde(default)]
    selected: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Low-level REST client
// ─────────────────────────────────────────────────────────────────────────────

/// Thin bearer-authorized client for the Calendar v3 REST API.
#[derive(Clone)]
pub struct CalendarApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl CalendarApiClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: CALENDAR_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (tests only).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn list_calendars(
        &self,
        access_token: &str,
    ) -> Result<Vec<RawCalendarListItem>, AppError> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        let list: CalendarListResponse = Self::check_response_json(response).await?;
        Ok(list.items)
    }

    async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        time_min: Option<&str>,
        time_max: Option<&str>,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );

        let mut params = vec![
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        if let Some(min) = time_min {
            params.push(("timeMin", min.to_string()));
        }
        if let Some(max) = time_max {
            params.push(("timeMax", max.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        let list: EventListResponse = Self::check_response_json(response).await?;
        Ok(list.items)
    }

    async fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &EventPayload,
    ) -> Result<CalendarEvent, AppError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        Self::check_response_json(response).await
    }

    async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        event: &EventPayload,
    ) -> Result<CalendarEvent, AppError> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url,
            urlencoding::encode(calendar_id),
            event_id
        );

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        Self::check_response_json(response).await
    }

    async fn delete_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), AppError> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url,
            urlencoding::encode(calendar_id),
            event_id
        );

        let response = self
            .http
            .delete(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        Self::check_response(response).await
    }

    /// Check response status; non-2xx raises with the HTTP status text.
    async fn check_response(response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        Err(AppError::CalendarApi(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::CalendarApi(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::CalendarApi(format!("JSON parse error: {}", e)))
    }
}

impl Default for CalendarApiClient {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token lifecycle
// ─────────────────────────────────────────────────────────────────────────────

/// What to do with the stored access token before a calendar call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// Token is still fresh; use it without a refresh call.
    UseCurrent,
    /// No refresh token stored; use the (possibly stale) token as-is.
    UseStaleNoRefreshToken,
    /// Token expired or expiring within the margin; attempt one refresh.
    Refresh,
}

/// Pure refresh decision: refresh exactly when a refresh token is present
/// and now >= expiry - 5min. A missing or unparseable expiry counts as
/// already expired.
pub fn refresh_decision(link: &CalendarLink, now: DateTime<Utc>) -> TokenAction {
    let has_refresh_token = link
        .refresh_token
        .as_deref()
        .map(|t| !t.is_empty())
        .unwrap_or(false);
    if !has_refresh_token {
        return TokenAction::UseStaleNoRefreshToken;
    }

    let expiry = link
        .token_expiry
        .as_deref()
        .and_then(parse_rfc3339)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    if now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= expiry {
        TokenAction::Refresh
    } else {
        TokenAction::UseCurrent
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CalendarService - high-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

/// High-level calendar service that manages the token lifecycle and
/// proxies Calendar API calls.
#[derive(Clone)]
pub struct CalendarService {
    client: CalendarApiClient,
    oauth: GoogleAuthClient,
    db: FirestoreDb,
}

impl CalendarService {
    pub fn new(client: CalendarApiClient, oauth: GoogleAuthClient, db: FirestoreDb) -> Self {
        Self { client, oauth, db }
    }

    // ─── Connection State ────────────────────────────────────────────────

    /// Store tokens after OAuth and mark the calendar connected.
    ///
    /// Assumes a 1-hour expiry when the provider did not supply one, and
    /// clears any stale cached calendar list.
    pub async fn connect(
        &self,
        uid: &str,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_in: Option<i64>,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let lifetime = expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        let mut profile = self.require_user(uid).await?;
        profile.calendar = CalendarLink {
            is_connected: true,
            access_token: Some(access_token.to_string()),
            refresh_token: refresh_token.map(str::to_string),
            token_expiry: Some(format_utc_rfc3339(now + Duration::seconds(lifetime))),
            last_sync: Some(format_utc_rfc3339(now)),
            calendars: Vec::new(),
        };
        self.db.upsert_user(&profile).await?;

        tracing::info!(
            uid,
            has_refresh_token = refresh_token.is_some(),
            "Calendar connected, tokens stored"
        );
        Ok(())
    }

    /// Clear all token fields and the cached calendar list.
    pub async fn disconnect(&self, uid: &str) -> Result<(), AppError> {
        let mut profile = self.require_user(uid).await?;
        profile.calendar = CalendarLink::default();
        self.db.upsert_user(&profile).await?;

        tracing::info!(uid, "Calendar disconnected");
        Ok(())
    }

    // ─── Calendar API Wrappers ───────────────────────────────────────────

    /// List the user's calendars and refresh the cached list on the
    /// profile.
    pub async fn list_calendars(&self, uid: &str) -> Result<Vec<CalendarRef>, AppError> {
        let profile = self.require_connected(uid).await?;
        let access_token = self.ensure_fresh_token(uid, &profile.calendar).await?;

        let calendars: Vec<CalendarRef> = self
            .client
            .list_calendars(&access_token)
            .await?
            .into_iter()
            .map(|item| CalendarRef {
                id: item.id,
                name: item.summary,
                color: item
                    .background_color
                    .unwrap_or_else(|| DEFAULT_CALENDAR_COLOR.to_string()),
                is_primary: item.primary.unwrap_or(false),
                is_enabled: item.selected.unwrap_or(false),
            })
            .collect();

        // Refresh the cached list; re-fetch in case the token refresh
        // already rewrote the profile.
        let mut profile = self.require_user(uid).await?;
        profile.calendar.calendars = calendars.clone();
        profile.calendar.last_sync = Some(format_utc_rfc3339(Utc::now()));
        self.db.upsert_user(&profile).await?;

        Ok(calendars)
    }

    /// List events from one calendar, expanded and ordered by start time.
    pub async fn list_events(
        &self,
        uid: &str,
        calendar_id: &str,
        time_min: Option<&str>,
        time_max: Option<&str>,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let profile = self.require_connected(uid).await?;
        let access_token = self.ensure_fresh_token(uid, &profile.calendar).await?;

        self.client
            .list_events(&access_token, calendar_id, time_min, time_max)
            .await
    }

    pub async fn create_event(
        &self,
        uid: &str,
        calendar_id: &str,
        event: &EventPayload,
    ) -> Result<CalendarEvent, AppError> {
        let profile = self.require_connected(uid).await?;
        let access_token = self.ensure_fresh_token(uid, &profile.calendar).await?;

        self.client
            .create_event(&access_token, calendar_id, event)
            .await
    }

    pub async fn update_event(
        &self,
        uid: &str,
        calendar_id: &str,
        event_id: &str,
        event: &EventPayload,
    ) -> Result<CalendarEvent, AppError> {
        let profile = self.require_connected(uid).await?;
        let access_token = self.ensure_fresh_token(uid, &profile.calendar).await?;

        self.client
            .update_event(&access_token, calendar_id, event_id, event)
            .await
    }

    pub async fn delete_event(
        &self,
        uid: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), AppError> {
        let profile = self.require_connected(uid).await?;
        let access_token = self.ensure_fresh_token(uid, &profile.calendar).await?;

        self.client
            .delete_event(&access_token, calendar_id, event_id)
            .await
    }

    // ─── Token Management ────────────────────────────────────────────────

    /// Return a usable access token, refreshing it first when it is
    /// within the expiry margin.
    ///
    /// At most one refresh call is made. On refresh success the new token
    /// and expiry are persisted before the calendar call proceeds; on
    /// refresh failure the stale token is returned as a best-effort
    /// fallback rather than failing the operation.
    pub async fn ensure_fresh_token(
        &self,
        uid: &str,
        link: &CalendarLink,
    ) -> Result<String, AppError> {
        let current = || {
            link.access_token
                .clone()
                .ok_or(AppError::CalendarNotConnected)
        };

        match refresh_decision(link, Utc::now()) {
            TokenAction::UseCurrent => current(),
            TokenAction::UseStaleNoRefreshToken => {
                tracing::warn!(uid, "No refresh token available, using current access token");
                current()
            }
            TokenAction::Refresh => {
                let refresh_token = link.refresh_token.clone().unwrap_or_default();
                match self.oauth.refresh_access_token(&refresh_token).await {
                    Ok(tokens) => {
                        self.store_refreshed_token(uid, &tokens.access_token, tokens.expires_in)
                            .await?;
                        Ok(tokens.access_token)
                    }
                    Err(e) => {
                        tracing::warn!(
                            uid,
                            error = %e,
                            "Failed to refresh token, using current access token"
                        );
                        current()
                    }
                }
            }
        }
    }

    /// Persist a freshly-issued access token and its computed expiry.
    async fn store_refreshed_token(
        &self,
        uid: &str,
        access_token: &str,
        expires_in: i64,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let mut profile = self.require_user(uid).await?;
        profile.calendar.access_token = Some(access_token.to_string());
        profile.calendar.token_expiry = Some(format_utc_rfc3339(now + Duration::seconds(expires_in)));
        profile.calendar.last_sync = Some(format_utc_rfc3339(now));
        self.db.upsert_user(&profile).await?;

        tracing::info!(uid, "Access token refreshed");
        Ok(())
    }

    // ─── Guards ──────────────────────────────────────────────────────────

    async fn require_user(&self, uid: &str) -> Result<UserProfile, AppError> {
        self.db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))
    }

    /// Load the profile and require a connected calendar with a stored
    /// access token.
    async fn require_connected(&self, uid: &str) -> Result<UserProfile, AppError> {
        let profile = self.require_user(uid).await?;
        let link = &profile.calendar;
        if !link.is_connected || link.access_token.as_deref().unwrap_or("").is_empty() {
            return Err(AppError::CalendarNotConnected);
        }
        Ok(profile)
    }
}
