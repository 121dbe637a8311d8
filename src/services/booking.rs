// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking lifecycle: create, cancel, check in.
//!
//! Capacity enforcement and the status transitions happen in single
//! Firestore transactions in the db layer; this service adds input
//! validation, the check-in time gating, and the hand-off of check-in
//! events to the streak engine.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{CheckInOutcome, Member, Reservation};
use crate::services::StreakService;
use crate::time_utils::{format_utc_rfc3339, CheckInWindow};
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Clone)]
pub struct BookingService {
    db: FirestoreDb,
    streaks: StreakService,
}

/// What a successful check-in produced, for the caller to surface.
#[derive(Debug, Clone)]
pub struct CheckInResult {
    pub reservation: Reservation,
    pub streak: CheckInOutcome,
}

impl BookingService {
    pub fn new(db: FirestoreDb, streaks: StreakService) -> Self {
        Self { db, streaks }
    }

    /// Book a spot in a class.
    ///
    /// Rejected with `DuplicateReservation` if the member already holds an
    /// active reservation, or `CapacityExceeded` if the class is full; both
    /// checks are transactional with the counter increment.
    pub async fn create_reservation(&self, class_id: &str, user_id: &str) -> Result<Reservation> {
        validate_ids(class_id, user_id)?;

        let member = self
            .db
            .get_member(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", user_id)))?;

        let now = format_utc_rfc3339(chrono::Utc::now());
        self.db
            .create_reservation_atomic(class_id, &member, &now)
            .await
    }

    /// Cancel an active reservation and release its spot.
    pub async fn cancel_reservation(&self, class_id: &str, user_id: &str) -> Result<()> {
        validate_ids(class_id, user_id)?;
        self.db.cancel_reservation_atomic(class_id, user_id).await
    }

    /// Check in to a class, gated on the check-in window.
    ///
    /// `now` is the studio's wall-clock time, passed in by the caller so the
    /// gating is testable. On success the reservation flips to checked-in
    /// and the streak engine is fed the class's calendar date.
    pub async fn check_in(
        &self,
        class_id: &str,
        user_id: &str,
        now: NaiveDateTime,
    ) -> Result<CheckInResult> {
        validate_ids(class_id, user_id)?;

        let class = self
            .db
            .get_class(class_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Class {} not found", class_id)))?;

        let window = CheckInWindow::for_class(class.date, &class.start_time, &class.end_time)
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "Class {} has malformed times {}-{}",
                    class_id,
                    class.start_time,
                    class.end_time
                ))
            })?;

        if !window.contains(now) {
            return Err(outside_window_error(&window, now));
        }

        let timestamp = format_utc_rfc3339(chrono::Utc::now());
        let reservation = self
            .db
            .check_in_reservation_atomic(class_id, user_id, &timestamp)
            .await?;

        // Feed the streak engine with the class's calendar date. Same-day
        // idempotence lives there, not here: a second class today checks in
        // fine but does not advance the streak again.
        let streak = self.streaks.record_check_in(user_id, class.date).await?;

        tracing::info!(
            class_id,
            user_id,
            streak = streak.current_streak,
            advanced = streak.advanced,
            "Check-in complete"
        );

        Ok(CheckInResult {
            reservation,
            streak,
        })
    }

    /// A member's non-cancelled reservations from `from` onwards.
    pub async fn upcoming_reservations(
        &self,
        user_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<Reservation>> {
        let reservations = self.db.list_reservations_for_user(user_id, from).await?;
        Ok(reservations.into_iter().filter(|r| r.is_active()).collect())
    }

    /// Look up the member behind a request, for role checks.
    pub async fn require_member(&self, user_id: &str) -> Result<Member> {
        self.db
            .get_member(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", user_id)))
    }
}

fn validate_ids(class_id: &str, user_id: &str) -> Result<()> {
    if class_id.is_empty() {
        return Err(AppError::BadRequest("Missing class ID".to_string()));
    }
    if user_id.is_empty() {
        return Err(AppError::BadRequest("Missing user ID".to_string()));
    }
    Ok(())
}

fn outside_window_error(window: &CheckInWindow, now: NaiveDateTime) -> AppError {
    if now < window.opens_at {
        AppError::OutsideCheckInWindow(format!(
            "Check-in opens in {} minutes",
            window.minutes_until_open(now)
        ))
    } else {
        AppError::OutsideCheckInWindow("Class has already ended".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::parse_hhmm;
    use chrono::NaiveDate;

    fn window() -> CheckInWindow {
        CheckInWindow::for_class(
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            "18:00",
            "19:00",
        )
        .unwrap()
    }

    fn at(hhmm: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_time(parse_hhmm(hhmm).unwrap())
    }

    #[test]
    fn test_early_check_in_reports_wait_time() {
        let err = outside_window_error(&window(), at("16:00"));
        match err {
            AppError::OutsideCheckInWindow(msg) => {
                assert!(msg.contains("90 minutes"), "unexpected message: {}", msg)
            }
            other => panic!("expected OutsideCheckInWindow, got {:?}", other),
        }
    }

    #[test]
    fn test_late_check_in_reports_class_over() {
        let err = outside_window_error(&window(), at("20:00"));
        match err {
            AppError::OutsideCheckInWindow(msg) => assert!(msg.contains("ended")),
            other => panic!("expected OutsideCheckInWindow, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_ids() {
        assert!(validate_ids("mon-18h", "user-1").is_ok());
        assert!(matches!(
            validate_ids("", "user-1"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_ids("mon-18h", ""),
            Err(AppError::BadRequest(_))
        ));
    }
}
