// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak engine: the two update paths for the consecutive-day counter.
//!
//! Check-ins advance the streak; the reconciliation pass on app foreground
//! catches decay (a missed day leaves no write behind, so it can only be
//! detected the next time the member shows up). The transition rules live
//! on [`StreakState`]; this service runs them against Firestore.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{CheckInOutcome, StreakState};
use crate::time_utils::format_utc_rfc3339;
use chrono::NaiveDate;

#[derive(Clone)]
pub struct StreakService {
    db: FirestoreDb,
}

impl StreakService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Apply a check-in on `date` to the member's streak.
    ///
    /// Idempotent per calendar day; the outcome says whether this check-in
    /// advanced the counter and from what value.
    pub async fn record_check_in(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<CheckInOutcome> {
        if user_id.is_empty() {
            return Err(AppError::BadRequest("Missing user ID".to_string()));
        }

        let now = format_utc_rfc3339(chrono::Utc::now());
        self.db.record_check_in_atomic(user_id, date, &now).await
    }

    /// Reconciliation pass, run once per app foreground.
    ///
    /// Returns the (possibly reset) state for immediate display.
    pub async fn reconcile_on_open(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<StreakState> {
        if user_id.is_empty() {
            return Err(AppError::BadRequest("Missing user ID".to_string()));
        }

        let now = format_utc_rfc3339(chrono::Utc::now());
        self.db.reconcile_streak_atomic(user_id, today, &now).await
    }

    /// Current streak state; zeroes for a member who never checked in.
    pub async fn get_streak(&self, user_id: &str) -> Result<StreakState> {
        Ok(self.db.get_streak(user_id).await?.unwrap_or_default())
    }
}
