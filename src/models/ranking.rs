// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly points scoring and leaderboard ranking.
//!
//! The scoring function and the ranking pass are pure; the service layer
//! feeds them counts gathered from Firestore. Nothing here is persisted:
//! the leaderboard is re-derived from raw records on every request.

use serde::{Deserialize, Serialize};

/// Points per checked-in class.
pub const CHECK_IN_POINTS: u32 = 1;
/// Points per completed WOD.
pub const WOD_POINTS: u32 = 2;

/// Bonus points for the member's current streak.
pub fn streak_bonus(streak: u32) -> u32 {
    match streak {
        s if s >= 10 => 15,
        s if s >= 5 => 5,
        _ => 0,
    }
}

/// Monthly score: check-ins and WODs are month-scoped counts, the streak is
/// the member's current global streak.
pub fn points(check_ins: u32, wods: u32, streak: u32) -> u32 {
    check_ins * CHECK_IN_POINTS + wods * WOD_POINTS + streak_bonus(streak)
}

/// Raw per-member activity counts for one month, in store enumeration order.
#[derive(Debug, Clone)]
pub struct ActivityCounts {
    pub user_id: String,
    pub display_name: String,
    pub check_ins: u32,
    pub wods: u32,
    pub streak: u32,
}

/// One leaderboard row. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedUser {
    /// 1-based position in the points-sorted list
    pub rank: u32,
    pub user_id: String,
    pub display_name: String,
    pub points: u32,
    pub check_ins: u32,
    pub wods: u32,
    pub streak: u32,
}

/// A member's own view of the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRankingData {
    pub rank: u32,
    pub points: u32,
    pub check_ins: u32,
    pub wods: u32,
    pub streak: u32,
    /// Points needed to overtake the member ranked immediately above;
    /// 0 at rank 1.
    pub points_to_next_rank: u32,
}

/// Score and rank one month's activity counts.
///
/// Members with zero points and zero check-ins are dropped. The sort is
/// stable, so equal-point members keep their input order and ranks are
/// dense 1-based positions.
pub fn rank_users(entries: Vec<ActivityCounts>) -> Vec<RankedUser> {
    let mut scored: Vec<RankedUser> = entries
        .into_iter()
        .map(|e| RankedUser {
            rank: 0,
            points: points(e.check_ins, e.wods, e.streak),
            user_id: e.user_id,
            display_name: e.display_name,
            check_ins: e.check_ins,
            wods: e.wods,
            streak: e.streak,
        })
        .filter(|r| r.points > 0 || r.check_ins > 0)
        .collect();

    scored.sort_by(|a, b| b.points.cmp(&a.points));

    for (i, row) in scored.iter_mut().enumerate() {
        row.rank = (i + 1) as u32;
    }

    scored
}

/// Derive a member's own ranking entry from a computed leaderboard.
///
/// A member absent from the board (no activity this month) gets a synthetic
/// entry ranked one past the end.
pub fn user_ranking_data(ranking: &[RankedUser], user_id: &str) -> UserRankingData {
    if let Some(entry) = ranking.iter().find(|r| r.user_id == user_id) {
        let points_to_next_rank = if entry.rank == 1 {
            0
        } else {
            // Stable ordering means the row above exists at rank - 2
            ranking[(entry.rank - 2) as usize].points - entry.points + 1
        };
        return UserRankingData {
            rank: entry.rank,
            points: entry.points,
            check_ins: entry.check_ins,
            wods: entry.wods,
            streak: entry.streak,
            points_to_next_rank,
        };
    }

    UserRankingData {
        rank: ranking.len() as u32 + 1,
        points: points(0, 0, 0),
        check_ins: 0,
        wods: 0,
        streak: 0,
        points_to_next_rank: ranking.last().map(|r| r.points + 1).unwrap_or(1),
    }
}
