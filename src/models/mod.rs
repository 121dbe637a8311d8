// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod class_session;
pub mod member;
pub mod ranking;
pub mod reservation;
pub mod streak;
pub mod wod;

pub use class_session::ClassSession;
pub use member::{Member, MemberRole};
pub use ranking::{ActivityCounts, RankedUser, UserRankingData};
pub use reservation::{Reservation, ReservationStatus};
pub use streak::{CheckInOutcome, Milestone, StreakState};
pub use wod::{Wod, WodResult, WodScore};
