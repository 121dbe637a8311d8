// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout-of-the-day (WOD) definition and per-member results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The workout published for a calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wod {
    /// WOD ID (also used as document ID)
    pub wod_id: String,
    /// Calendar date the WOD is programmed for
    pub date: NaiveDate,
    /// Short title ("Fran", "Murph", ...)
    pub title: String,
    /// Movements, rep scheme, coach notes
    pub description: String,
    pub created_at: String,
}

/// How a WOD result is scored.
///
/// Exactly one interpretation applies per submission: a time, an AMRAP
/// round count, or a plain rep count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WodScore {
    ForTime { minutes: u32, seconds: u32 },
    Amrap { rounds: u32, reps: u32 },
    Reps { reps: u32 },
}

/// A member's result for a WOD, stored in `wod_results/{wod_id}_{user_id}`.
///
/// Resubmitting overwrites the previous document, so a member logically has
/// at most one result per WOD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WodResult {
    pub user_id: String,
    pub wod_id: String,
    /// Denormalized from the WOD so monthly counts are one range query
    pub wod_date: NaiveDate,
    /// Denormalized member name for result boards
    pub display_name: String,
    pub score: WodScore,
    /// Performed as prescribed (no scaling)
    pub rx: bool,
    pub recorded_at: String,
}

impl WodResult {
    /// Composite document ID for a (WOD, member) pair.
    pub fn doc_id(wod_id: &str, user_id: &str) -> String {
        format!(
            "{}_{}",
            urlencoding::encode(wod_id),
            urlencoding::encode(user_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_tagged_by_type() {
        let score = WodScore::ForTime {
            minutes: 7,
            seconds: 43,
        };
        let json = serde_json::to_value(&score).unwrap();

        assert_eq!(json["type"], "for_time");
        assert_eq!(json["minutes"], 7);
        assert_eq!(json["seconds"], 43);
    }

    #[test]
    fn test_score_rejects_untagged_payload() {
        let err = serde_json::from_str::<WodScore>(r#"{"rounds": 5, "reps": 12}"#);
        assert!(err.is_err());
    }
}
