//! Member profile model for storage and API.

use serde::{Deserialize, Serialize};

/// Role of a member within the studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
    Coach,
}

/// Member profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Auth provider user ID (also used as document ID)
    pub user_id: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Name shown on the leaderboard
    pub display_name: String,
    /// Member or coach
    pub role: MemberRole,
    /// Active members are the ones enumerated by the monthly ranking
    pub active: bool,
    /// When the member joined
    pub created_at: String,
    /// Last activity timestamp
    pub last_active: String,
}

impl Member {
    pub fn is_coach(&self) -> bool {
        self.role == MemberRole::Coach
    }
}
