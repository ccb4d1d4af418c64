// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity & session management.
//!
//! Completes a Google sign-in: makes sure a profile document exists
//! (created with defaults on first sign-in, merged with login stats on
//! every later one) and hands any calendar tokens from the consent to the
//! calendar service. Calendar linkage is best-effort; sign-in never fails
//! because of it.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{GoogleIdentity, UserProfile};
use crate::services::calendar::CalendarService;
use chrono::Utc;

/// Session service.
#[derive(Clone)]
pub struct SessionService {
    db: FirestoreDb,
    calendar: CalendarService,
}

impl SessionService {
    pub fn new(db: FirestoreDb, calendar: CalendarService) -> Self {
        Self { db, calendar }
    }

    /// Finish a sign-in after the OAuth code exchange.
    ///
    /// Returns the persisted (created or merged) profile.
    pub async fn complete_sign_in(
        &self,
        identity: &GoogleIdentity,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
        expires_in: Option<i64>,
    ) -> Result<UserProfile, AppError> {
        let profile = self.ensure_profile(identity).await?;

        // Link the calendar with the tokens from the consent, if any.
        // Failure is logged and swallowed: sign-in must not fail because
        // calendar linkage failed.
        if let Some(token) = access_token {
            if let Err(e) = self
                .calendar
                .connect(&identity.uid, token, refresh_token, expires_in)
                .await
            {
                tracing::warn!(
                    uid = %identity.uid,
                    error = %e,
                    "Failed to store calendar tokens, continuing sign-in"
                );
            }
        }

        Ok(profile)
    }

    /// Make sure a profile document exists for this identity.
    async fn ensure_profile(&self, identity: &GoogleIdentity) -> Result<UserProfile, AppError> {
        let now = Utc::now();

        let profile = match self.db.get_user(&identity.uid).await? {
            Some(mut existing) => {
                existing.apply_login(identity, now);
                existing
            }
            None => {
                tracing::info!(uid = %identity.uid, "Creating new user profile");
                UserProfile::new_default(identity, now)
            }
        };

        self.db.upsert_user(&profile).await?;
        Ok(profile)
    }

    /// Load a profile for the API layer.
    pub async fn get_profile(&self, uid: &str) -> Result<UserProfile, AppError> {
        self.db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))
    }
}
