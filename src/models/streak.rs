// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Consecutive-day training streak state and its transition rules.
//!
//! The streak advances at most once per calendar day, on the first check-in
//! of that day. Decay cannot be observed by a write-triggered event (nothing
//! writes on a day the member stays home), so `reconcile` runs on every app
//! foreground and resets the counter once a full day has been skipped.
//!
//! Both transitions are pure; the db layer runs them inside Firestore
//! transactions so concurrent check-ins for the same member cannot
//! double-increment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-member streak state, stored in `streaks/{user_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive days trained, as of `last_check_in_date`
    #[serde(default)]
    pub current_streak: u32,
    /// Longest streak ever reached; never less than `current_streak`
    #[serde(default)]
    pub longest_streak: u32,
    /// Calendar date of the most recent counted check-in
    #[serde(default)]
    pub last_check_in_date: Option<NaiveDate>,
    /// Last update timestamp (RFC3339)
    #[serde(default)]
    pub updated_at: String,
}

impl Default for StreakState {
    fn default() -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            last_check_in_date: None,
            updated_at: String::new(),
        }
    }
}

/// What a check-in did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInOutcome {
    pub previous_streak: u32,
    pub current_streak: u32,
    /// False for the second and later check-ins of the same day
    pub advanced: bool,
}

impl CheckInOutcome {
    /// Milestone reached by this check-in, if any.
    pub fn milestone(&self) -> Option<Milestone> {
        if !self.advanced {
            return None;
        }
        Milestone::for_streak(self.current_streak)
    }
}

/// Streak milestones worth celebrating in the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    /// Every multiple of 10 days
    TenDayMultiple(u32),
    /// Every other multiple of 5 days
    FiveDayMultiple(u32),
}

impl Milestone {
    pub fn for_streak(streak: u32) -> Option<Self> {
        if streak == 0 {
            None
        } else if streak % 10 == 0 {
            Some(Milestone::TenDayMultiple(streak))
        } else if streak % 5 == 0 {
            Some(Milestone::FiveDayMultiple(streak))
        } else {
            None
        }
    }
}

impl StreakState {
    /// Apply a check-in on `date`.
    ///
    /// Idempotent per calendar day: a second check-in on the same date
    /// reports `advanced = false` and leaves the counters untouched.
    pub fn apply_check_in(&mut self, date: NaiveDate, now: &str) -> CheckInOutcome {
        let previous = self.current_streak;

        if self.last_check_in_date == Some(date) {
            return CheckInOutcome {
                previous_streak: previous,
                current_streak: previous,
                advanced: false,
            };
        }

        let continues = self
            .last_check_in_date
            .is_some_and(|last| (date - last).num_days() == 1);

        self.current_streak = if continues { previous + 1 } else { 1 };
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_check_in_date = Some(date);
        self.updated_at = now.to_string();

        CheckInOutcome {
            previous_streak: previous,
            current_streak: self.current_streak,
            advanced: true,
        }
    }

    /// Reconciliation pass run on app foreground.
    ///
    /// A gap of one day is still a valid continuation window (yesterday's
    /// check-in keeps the streak alive through today); a gap of two or more
    /// means at least one full day was skipped and the streak resets to 0.
    /// Returns true if the state changed.
    pub fn reconcile(&mut self, today: NaiveDate, now: &str) -> bool {
        let Some(last) = self.last_check_in_date else {
            return false;
        };

        let gap = (today - last).num_days();
        if gap < 2 || self.current_streak == 0 {
            return false;
        }

        self.current_streak = 0;
        self.updated_at = now.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2024-01-15T12:00:00Z";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_check_in_starts_at_one() {
        let mut streak = StreakState::default();
        let outcome = streak.apply_check_in(date(2024, 1, 1), NOW);

        assert!(outcome.advanced);
        assert_eq!(outcome.previous_streak, 0);
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 1);
        assert_eq!(streak.last_check_in_date, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_consecutive_days_increment() {
        let mut streak = StreakState::default();
        for day in 1..=7 {
            streak.apply_check_in(date(2024, 1, day), NOW);
        }

        assert_eq!(streak.current_streak, 7);
        assert_eq!(streak.longest_streak, 7);
    }

    #[test]
    fn test_same_day_check_in_is_idempotent() {
        let mut streak = StreakState::default();
        streak.apply_check_in(date(2024, 1, 1), NOW);
        let again = streak.apply_check_in(date(2024, 1, 1), NOW);

        assert!(!again.advanced);
        assert_eq!(again.current_streak, 1);
        assert_eq!(streak.current_streak, 1);
    }

    #[test]
    fn test_gap_restarts_streak_at_one() {
        let mut streak = StreakState::default();
        streak.apply_check_in(date(2024, 1, 1), NOW);
        streak.apply_check_in(date(2024, 1, 2), NOW);
        let outcome = streak.apply_check_in(date(2024, 1, 5), NOW);

        assert!(outcome.advanced);
        assert_eq!(streak.current_streak, 1);
        // Longest survives the restart
        assert_eq!(streak.longest_streak, 2);
    }

    #[test]
    fn test_reconcile_next_day_is_noop() {
        let mut streak = StreakState::default();
        streak.apply_check_in(date(2024, 1, 1), NOW);

        let changed = streak.reconcile(date(2024, 1, 2), NOW);

        assert!(!changed);
        assert_eq!(streak.current_streak, 1);
    }

    #[test]
    fn test_reconcile_after_skipped_day_resets() {
        let mut streak = StreakState::default();
        streak.apply_check_in(date(2024, 1, 1), NOW);
        streak.apply_check_in(date(2024, 1, 2), NOW);

        let changed = streak.reconcile(date(2024, 1, 5), NOW);

        assert!(changed);
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 2);
        // The last counted check-in date is preserved for history
        assert_eq!(streak.last_check_in_date, Some(date(2024, 1, 2)));
    }

    #[test]
    fn test_reconcile_without_history_is_noop() {
        let mut streak = StreakState::default();
        assert!(!streak.reconcile(date(2024, 1, 5), NOW));
        assert_eq!(streak.current_streak, 0);
    }

    #[test]
    fn test_reconcile_is_idempotent_after_reset() {
        let mut streak = StreakState::default();
        streak.apply_check_in(date(2024, 1, 1), NOW);
        assert!(streak.reconcile(date(2024, 1, 4), NOW));
        assert!(!streak.reconcile(date(2024, 1, 4), NOW));
    }

    #[test]
    fn test_check_in_after_reconcile_reset_restarts() {
        let mut streak = StreakState::default();
        streak.apply_check_in(date(2024, 1, 1), NOW);
        streak.reconcile(date(2024, 1, 4), NOW);

        let outcome = streak.apply_check_in(date(2024, 1, 4), NOW);

        assert!(outcome.advanced);
        assert_eq!(streak.current_streak, 1);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let mut streak = StreakState::default();
        streak.apply_check_in(date(2024, 1, 31), NOW);
        streak.apply_check_in(date(2024, 2, 1), NOW);

        assert_eq!(streak.current_streak, 2);
    }

    #[test]
    fn test_milestones() {
        assert_eq!(Milestone::for_streak(0), None);
        assert_eq!(Milestone::for_streak(4), None);
        assert_eq!(Milestone::for_streak(5), Some(Milestone::FiveDayMultiple(5)));
        assert_eq!(Milestone::for_streak(10), Some(Milestone::TenDayMultiple(10)));
        assert_eq!(Milestone::for_streak(15), Some(Milestone::FiveDayMultiple(15)));
        assert_eq!(Milestone::for_streak(20), Some(Milestone::TenDayMultiple(20)));
    }

    #[test]
    fn test_milestone_not_reported_on_idempotent_check_in() {
        let mut streak = StreakState::default();
        for day in 1..=5 {
            streak.apply_check_in(date(2024, 1, day), NOW);
        }
        let repeat = streak.apply_check_in(date(2024, 1, 5), NOW);

        assert_eq!(repeat.milestone(), None);
    }
}
