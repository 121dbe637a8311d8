// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Business logic services.

pub mod booking;
pub mod ranking;
pub mod streak;

pub use booking::{BookingService, CheckInResult};
pub use ranking::RankingService;
pub use streak::StreakService;
