//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const MEMBERS: &str = "members";
    pub const CLASSES: &str = "classes";
    pub const RESERVATIONS: &str = "reservations";
    /// Per-member streak state (keyed by user_id)
    pub const STREAKS: &str = "streaks";
    pub const WODS: &str = "wods";
    pub const WOD_RESULTS: &str = "wod_results";
}
