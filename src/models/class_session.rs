//! Scheduled class session model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A scheduled class occurrence stored in Firestore.
///
/// `reservation_count` is a derived counter maintained transactionally with
/// reservation writes; it never exceeds `capacity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSession {
    /// Class session ID (also used as document ID)
    pub class_id: String,
    /// Class name shown in the schedule ("WOD", "Mobility", ...)
    pub name: String,
    /// Instructor name
    pub instructor: String,
    /// Discipline/category ("crossfit", "weightlifting", ...)
    pub discipline: String,
    /// Level ("all", "beginner", "advanced")
    pub level: String,
    /// Calendar date of the session
    pub date: NaiveDate,
    /// Scheduled start, "HH:MM" on the studio's wall clock
    pub start_time: String,
    /// Scheduled end, "HH:MM"
    pub end_time: String,
    /// Maximum attendees
    pub capacity: u32,
    /// Current non-cancelled reservations
    pub reservation_count: u32,
    /// When the session was published
    pub created_at: String,
}

impl ClassSession {
    pub fn is_full(&self) -> bool {
        self.reservation_count >= self.capacity
    }
}
