//! User profile model for storage and API.
//!
//! Profiles are decoded with defaults at the storage boundary: every
//! nested structure carries serde defaults, so a partially-populated
//! document always deserializes into a fully-populated record.

use serde::{Deserialize, Serialize};

use crate::time_utils::format_utc_rfc3339;

/// User profile stored in Firestore at `users/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Provider subject ID (also used as document ID)
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
    /// When the profile was first created (RFC3339)
    #[serde(default)]
    pub created_at: String,
    /// Most recent sign-in (RFC3339)
    #[serde(default)]
    pub last_login_at: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub subscription: Subscription,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub metadata: Metadata,
    /// Google Calendar connection state, absent until first connect
    #[serde(default)]
    pub calendar: CalendarLink,
}

fn default_true() -> bool {
    true
}

fn default_role() -> String {
    "user".to_string()
}

/// UI preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            notifications: true,
            language: default_language(),
            timezone: default_timezone(),
        }
    }
}

/// Subscription state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default = "default_plan")]
    pub plan: String,
    #[serde(default = "default_sub_status")]
    pub status: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub trial_ends_at: Option<String>,
}

fn default_plan() -> String {
    "free".to_string()
}

fn default_sub_status() -> String {
    "active".to_string()
}

impl Default for Subscription {
    fn default() -> Self {
        Self {
            plan: default_plan(),
            status: default_sub_status(),
            start_date: String::new(),
            end_date: None,
            trial_ends_at: None,
        }
    }
}

/// Account limits for the free tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_projects")]
    pub projects: u32,
    /// Storage allowance in MB
    #[serde(default = "default_storage_mb")]
    pub storage_mb: u32,
    #[serde(default = "default_team_members")]
    pub team_members: u32,
    #[serde(default = "default_api_calls")]
    pub api_calls: u32,
}

fn default_projects() -> u32 {
    3
}

fn default_storage_mb() -> u32 {
    100
}

fn default_team_members() -> u32 {
    1
}

fn default_api_calls() -> u32 {
    1000
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            projects: default_projects(),
            storage_mb: default_storage_mb(),
            team_members: default_team_members(),
            api_calls: default_api_calls(),
        }
    }
}

/// Sign-up and login bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default = "default_sign_up_method")]
    pub sign_up_method: String,
    #[serde(default)]
    pub last_seen: String,
    #[serde(default)]
    pub login_count: u32,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
}

fn default_sign_up_method() -> String {
    "google".to_string()
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            sign_up_method: default_sign_up_method(),
            last_seen: String::new(),
            login_count: 0,
            email_verified: false,
            phone_number: String::new(),
            company: String::new(),
            location: String::new(),
        }
    }
}

/// Google Calendar connection state, embedded in the user profile.
///
/// `is_connected == true` implies an access token was stored at connection
/// time; the token may expire without the flag being cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarLink {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token expiry (RFC3339)
    #[serde(default)]
    pub token_expiry: Option<String>,
    /// Last calendar-list sync (RFC3339)
    #[serde(default)]
    pub last_sync: Option<String>,
    /// Cached calendar list from the last sync
    #[serde(default)]
    pub calendars: Vec<CalendarRef>,
}

/// One calendar from the user's Google calendar list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarRef {
    pub id: String,
    pub name: String,
    pub color: String,
    pub is_primary: bool,
    pub is_enabled: bool,
}

/// Identity claims extracted from a Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
}

impl UserProfile {
    /// Build a fresh profile with defaulted sub-records for a first sign-in.
    pub fn new_default(identity: &GoogleIdentity, now: chrono::DateTime<chrono::Utc>) -> Self {
        let now_str = format_utc_rfc3339(now);
        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone().unwrap_or_default(),
            display_name: identity.display_name.clone().unwrap_or_default(),
            photo_url: identity.photo_url.clone().unwrap_or_default(),
            created_at: now_str.clone(),
            last_login_at: now_str.clone(),
            is_active: true,
            role: default_role(),
            preferences: Preferences::default(),
            subscription: Subscription {
                start_date: now_str.clone(),
                ..Subscription::default()
            },
            limits: Limits::default(),
            metadata: Metadata {
                last_seen: now_str,
                login_count: 1,
                email_verified: identity.email_verified,
                ..Metadata::default()
            },
            calendar: CalendarLink::default(),
        }
    }

    /// Merge login-stat updates for a repeat sign-in: bump the login
    /// counter, refresh last-seen/last-login, and pick up identity fields
    /// the provider supplied.
    pub fn apply_login(&mut self, identity: &GoogleIdentity, now: chrono::DateTime<chrono::Utc>) {
        let now_str = format_utc_rfc3339(now);
        self.last_login_at = now_str.clone();
        self.metadata.last_seen = now_str;
        self.metadata.login_count += 1;
        if identity.email_verified {
            self.metadata.email_verified = true;
        }
        if let Some(email) = &identity.email {
            self.email = email.clone();
        }
        if let Some(name) = &identity.display_name {
            self.display_name = name.clone();
        }
        if let Some(photo) = &identity.photo_url {
            self.photo_url = photo.clone();
        }
    }

    /// Display name falling back to email.
    pub fn display_name(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else if !self.email.is_empty() {
            &self.email
        } else {
            "Unknown User"
        }
    }

    /// Up to two initials from the display name.
    pub fn initials(&self) -> String {
        self.display_name()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }

    pub fn is_profile_complete(&self) -> bool {
        !self.uid.is_empty() && !self.email.is_empty() && !self.display_name.is_empty()
    }

    pub fn is_subscription_active(&self) -> bool {
        self.subscription.status == "active"
    }

    pub fn is_on_trial(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.subscription
            .trial_ends_at
            .as_deref()
            .and_then(crate::time_utils::parse_rfc3339)
            .map(|end| end > now)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn identity() -> GoogleIdentity {
        GoogleIdentity {
            uid: "uid-1".to_string(),
            email: Some("pat@example.com".to_string()),
            display_name: Some("Pat Landscaper".to_string()),
            photo_url: None,
            email_verified: true,
        }
    }

    #[test]
    fn test_new_default_profile() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap();
        let profile = UserProfile::new_default(&identity(), now);

        assert_eq!(profile.uid, "uid-1");
        assert_eq!(profile.role, "user");
        assert!(profile.is_active);
        assert_eq!(profile.metadata.login_count, 1);
        assert_eq!(profile.subscription.plan, "free");
        assert_eq!(profile.limits.projects, 3);
        assert!(!profile.calendar.is_connected);
        assert_eq!(profile.created_at, "2026-01-10T08:00:00Z");
    }

    #[test]
    fn test_apply_login_increments_counter() {
        let created = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap();
        let mut profile = UserProfile::new_default(&identity(), created);

        let later = Utc.with_ymd_and_hms(2026, 2, 1, 12, 30, 0).unwrap();
        profile.apply_login(&identity(), later);

        assert_eq!(profile.metadata.login_count, 2);
        assert_eq!(profile.last_login_at, "2026-02-01T12:30:00Z");
        assert_eq!(profile.metadata.last_seen, "2026-02-01T12:30:00Z");
        // Creation timestamp is never touched
        assert_eq!(profile.created_at, "2026-01-10T08:00:00Z");
    }

    #[test]
    fn test_decode_with_defaults_fills_missing_sections() {
        // A minimal document written by an older client
        let raw = serde_json::json!({
            "uid": "uid-2",
            "email": "old@example.com"
        });

        let profile: UserProfile = serde_json::from_value(raw).expect("decodes");

        assert_eq!(profile.preferences.theme, "light");
        assert_eq!(profile.subscription.plan, "free");
        assert_eq!(profile.limits.api_calls, 1000);
        assert!(profile.is_active);
        assert!(!profile.calendar.is_connected);
        assert!(profile.calendar.calendars.is_empty());
    }

    #[test]
    fn test_initials() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap();
        let profile = UserProfile::new_default(&identity(), now);
        assert_eq!(profile.initials(), "PL");
    }
}
