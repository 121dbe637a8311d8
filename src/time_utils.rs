// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for dates, times and the check-in window.
//!
//! Class times are stored as "HH:MM" strings on the studio's wall clock;
//! timestamps are RFC3339 UTC. The studio's calendar day is derived from
//! UTC via a configured offset, so "today" means today at the studio.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime,
    SecondsFormat, Utc};

/// How long before the scheduled start the check-in window opens.
pub const CHECK_IN_OPENS_BEFORE_MINUTES: i64 = 30;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an "HH:MM" wall-clock time.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Current wall-clock time at the studio.
pub fn studio_now(utc_offset_minutes: i32) -> NaiveDateTime {
    (Utc::now() + Duration::minutes(utc_offset_minutes as i64)).naive_utc()
}

/// Current calendar date at the studio.
pub fn studio_today(utc_offset_minutes: i32) -> NaiveDate {
    studio_now(utc_offset_minutes).date()
}

/// The interval during which checking in to a class is allowed:
/// from 30 minutes before the scheduled start through the scheduled end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckInWindow {
    pub opens_at: NaiveDateTime,
    pub closes_at: NaiveDateTime,
}

impl CheckInWindow {
    /// Compute the window for a class session.
    ///
    /// Returns `None` if either time string is malformed. An `end_time` at
    /// or before `start_time` means the session crosses midnight.
    pub fn for_class(date: NaiveDate, start_time: &str, end_time: &str) -> Option<Self> {
        let start = parse_hhmm(start_time)?;
        let end = parse_hhmm(end_time)?;

        let starts_at = date.and_time(start);
        let mut closes_at = date.and_time(end);
        if end <= start {
            closes_at = closes_at + Duration::days(1);
        }

        Some(Self {
            opens_at: starts_at - Duration::minutes(CHECK_IN_OPENS_BEFORE_MINUTES),
            closes_at,
        })
    }

    /// Whether `now` falls inside the window (inclusive on both ends).
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        now >= self.opens_at && now <= self.closes_at
    }

    /// Minutes remaining until the window opens. Zero once it is open.
    pub fn minutes_until_open(&self, now: NaiveDateTime) -> i64 {
        (self.opens_at - now).num_minutes().max(0)
    }
}

/// First and last calendar day of a month, the scope of a ranking pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthBounds {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl MonthBounds {
    /// Bounds of the calendar month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first);
        Self { first, last }
    }

    /// Whether `date` falls inside the bounds (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }
}
