// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reservation model: one document per (class, member) booking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a reservation.
///
/// Confirmed -> CheckedIn happens at most once, inside the check-in window.
/// Either state may transition to Cancelled; a cancelled reservation is
/// never resurrected (re-booking writes a fresh confirmed record over it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReservationStatus {
    Confirmed,
    CheckedIn,
    Cancelled,
}

/// Stored reservation record in Firestore.
///
/// Document ID is `"{class_id}_{user_id}"`, so a member can hold at most
/// one reservation document per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub class_id: String,
    pub user_id: String,
    /// Denormalized from the class for schedule listings
    pub class_name: String,
    pub instructor: String,
    pub class_date: NaiveDate,
    /// "HH:MM" on the studio's wall clock
    pub start_time: String,
    pub end_time: String,
    pub status: ReservationStatus,
    pub created_at: String,
    /// Stamped when the member checks in
    pub checked_in_at: Option<String>,
}

impl Reservation {
    /// Composite document ID for a (class, member) pair.
    pub fn doc_id(class_id: &str, user_id: &str) -> String {
        format!(
            "{}_{}",
            urlencoding::encode(class_id),
            urlencoding::encode(user_id)
        )
    }

    /// Whether this reservation still occupies a spot in the class.
    pub fn is_active(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_escapes_unsafe_characters() {
        // Firestore document IDs must not contain "/".
        assert_eq!(
            Reservation::doc_id("mon-18h", "auth0|42/x"),
            "mon-18h_auth0%7C42%2Fx"
        );
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&ReservationStatus::CheckedIn).unwrap();
        assert_eq!(json, "\"checked-in\"");
    }
}
