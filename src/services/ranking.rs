// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points & ranking engine: the monthly leaderboard.
//!
//! Re-derived from raw reservation and WOD-result records on every call;
//! there are no cached counters to drift. Per-member reads are fanned out
//! with a bounded concurrency limit to avoid overloading Firestore while
//! keeping the stable member order the tie-break rule depends on.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::ranking::{self, ActivityCounts, RankedUser, UserRankingData};
use crate::time_utils::MonthBounds;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 10;

#[derive(Clone)]
pub struct RankingService {
    db: FirestoreDb,
}

impl RankingService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Compute the leaderboard for one calendar month.
    ///
    /// Check-in and WOD counts are scoped to the month; the streak fed into
    /// the bonus is each member's current global streak.
    pub async fn compute_monthly_ranking(&self, bounds: MonthBounds) -> Result<Vec<RankedUser>> {
        let members = self.db.list_active_members().await?;

        tracing::debug!(
            members = members.len(),
            first = %bounds.first,
            last = %bounds.last,
            "Computing monthly ranking"
        );

        // `buffered` (not `buffer_unordered`) keeps store enumeration order,
        // which is the tie-break order for equal points.
        let counts = stream::iter(members)
            .map(|member| {
                let db = self.db.clone();
                async move {
                    let check_ins = db
                        .checked_in_reservations_in_range(
                            &member.user_id,
                            bounds.first,
                            bounds.last,
                        )
                        .await?
                        .len() as u32;

                    let wods = db
                        .wod_results_in_range(&member.user_id, bounds.first, bounds.last)
                        .await?
                        .len() as u32;

                    let streak = db
                        .get_streak(&member.user_id)
                        .await?
                        .map(|s| s.current_streak)
                        .unwrap_or(0);

                    Ok::<_, AppError>(ActivityCounts {
                        user_id: member.user_id,
                        display_name: member.display_name,
                        check_ins,
                        wods,
                        streak,
                    })
                }
            })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<ActivityCounts>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<ActivityCounts>>>()?;

        Ok(ranking::rank_users(counts))
    }

    /// A member's own leaderboard entry, with the distance to the next rank.
    ///
    /// A member with no activity this month gets a synthetic entry ranked
    /// one past the end of the board.
    pub async fn get_user_ranking_data(
        &self,
        user_id: &str,
        bounds: MonthBounds,
    ) -> Result<UserRankingData> {
        let board = self.compute_monthly_ranking(bounds).await?;
        Ok(ranking::user_ranking_data(&board, user_id))
    }
}
