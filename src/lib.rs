// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Boxbook: class booking, WOD logging and streaks for a fitness studio
//!
//! This crate provides the backend API behind the studio's mobile app:
//! reservations with capacity enforcement, check-in gating, the
//! consecutive-day training streak, and the monthly points leaderboard.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{BookingService, RankingService, StreakService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub booking: BookingService,
    pub streaks: StreakService,
    pub ranking: RankingService,
}
