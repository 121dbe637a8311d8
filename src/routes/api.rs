// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated members.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{
    Milestone, RankedUser, Reservation, ReservationStatus, UserRankingData, WodScore,
};
use crate::time_utils::{format_utc_rfc3339, studio_now, studio_today, MonthBounds};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/classes", get(get_classes))
        .route("/api/reservations", get(get_reservations))
        .route(
            "/api/classes/{class_id}/reservations",
            post(book_class).delete(cancel_reservation),
        )
        .route("/api/classes/{class_id}/check-in", post(check_in))
        .route("/api/streak", get(get_streak))
        .route("/api/streak/reconcile", post(reconcile_streak))
        .route("/api/ranking", get(get_ranking))
        .route("/api/ranking/me", get(get_my_ranking))
        .route("/api/wods/today", get(get_todays_wod))
        .route("/api/wods/{wod_id}/results", post(submit_wod_result))
}

// ─── Member Profile ──────────────────────────────────────────

/// Current member response.
#[derive(Serialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
    pub active: bool,
}

/// Get current member profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MemberResponse>> {
    let member = state.booking.require_member(&user.user_id).await?;

    let role = if member.is_coach() { "coach" } else { "member" }.to_string();
    Ok(Json(MemberResponse {
        user_id: member.user_id,
        display_name: member.display_name,
        email: member.email,
        role,
        active: member.active,
    }))
}

// ─── Schedule & Booking ──────────────────────────────────────

#[derive(Deserialize)]
struct ClassesQuery {
    /// Calendar date (YYYY-MM-DD); defaults to today at the studio
    date: Option<String>,
}

#[derive(Serialize)]
pub struct ClassSummary {
    pub class_id: String,
    pub name: String,
    pub instructor: String,
    pub discipline: String,
    pub level: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub capacity: u32,
    pub reservation_count: u32,
    pub spots_left: u32,
}

#[derive(Serialize)]
pub struct ClassesResponse {
    pub date: String,
    pub classes: Vec<ClassSummary>,
}

fn parse_date_param(raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    raw.map(|s| {
        s.parse::<NaiveDate>().map_err(|_| {
            crate::error::AppError::BadRequest(
                "Invalid 'date' parameter: must be YYYY-MM-DD".to_string(),
            )
        })
    })
    .transpose()
    .map(|parsed| parsed.unwrap_or(default))
}

/// Get the class schedule for one day.
async fn get_classes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassesQuery>,
) -> Result<Json<ClassesResponse>> {
    let today = studio_today(state.config.studio_utc_offset_minutes);
    let date = parse_date_param(params.date.as_deref(), today)?;

    let classes = state.db.list_classes_for_date(date).await?;

    let summaries = classes
        .into_iter()
        .map(|c| ClassSummary {
            spots_left: c.capacity.saturating_sub(c.reservation_count),
            class_id: c.class_id,
            name: c.name,
            instructor: c.instructor,
            discipline: c.discipline,
            level: c.level,
            date: c.date.to_string(),
            start_time: c.start_time,
            end_time: c.end_time,
            capacity: c.capacity,
            reservation_count: c.reservation_count,
        })
        .collect();

    Ok(Json(ClassesResponse {
        date: date.to_string(),
        classes: summaries,
    }))
}

#[derive(Serialize)]
pub struct ReservationSummary {
    pub class_id: String,
    pub class_name: String,
    pub instructor: String,
    pub class_date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: ReservationStatus,
}

impl From<Reservation> for ReservationSummary {
    fn from(r: Reservation) -> Self {
        Self {
            class_id: r.class_id,
            class_name: r.class_name,
            instructor: r.instructor,
            class_date: r.class_date.to_string(),
            start_time: r.start_time,
            end_time: r.end_time,
            status: r.status,
        }
    }
}

/// Get the member's upcoming reservations.
async fn get_reservations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ReservationSummary>>> {
    let today = studio_today(state.config.studio_utc_offset_minutes);
    let reservations = state
        .booking
        .upcoming_reservations(&user.user_id, today)
        .await?;

    Ok(Json(
        reservations.into_iter().map(ReservationSummary::from).collect(),
    ))
}

/// Book a spot in a class.
async fn book_class(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(class_id): Path<String>,
) -> Result<Json<ReservationSummary>> {
    let reservation = state
        .booking
        .create_reservation(&class_id, &user.user_id)
        .await?;

    Ok(Json(ReservationSummary::from(reservation)))
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub success: bool,
    pub message: String,
}

/// Cancel the member's reservation for a class.
async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(class_id): Path<String>,
) -> Result<Json<CancelResponse>> {
    state
        .booking
        .cancel_reservation(&class_id, &user.user_id)
        .await?;

    Ok(Json(CancelResponse {
        success: true,
        message: "Reservation cancelled. Your spot is free again.".to_string(),
    }))
}

// ─── Check-in & Streak ───────────────────────────────────────

#[derive(Serialize)]
pub struct CheckInResponse {
    pub class_id: String,
    pub checked_in_at: Option<String>,
    pub streak: u32,
    pub streak_advanced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_message: Option<String>,
}

/// Map a streak milestone to the celebratory copy shown in the app.
fn milestone_message(milestone: Milestone) -> String {
    match milestone {
        Milestone::TenDayMultiple(days) => {
            format!("{} days in a row! You're on fire!", days)
        }
        Milestone::FiveDayMultiple(days) => {
            format!("{} day streak! Keep showing up!", days)
        }
    }
}

/// Check in to a class inside its check-in window.
async fn check_in(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(class_id): Path<String>,
) -> Result<Json<CheckInResponse>> {
    let now = studio_now(state.config.studio_utc_offset_minutes);
    let result = state.booking.check_in(&class_id, &user.user_id, now).await?;

    Ok(Json(CheckInResponse {
        class_id: result.reservation.class_id,
        checked_in_at: result.reservation.checked_in_at,
        streak: result.streak.current_streak,
        streak_advanced: result.streak.advanced,
        milestone_message: result.streak.milestone().map(milestone_message),
    }))
}

#[derive(Serialize)]
pub struct StreakResponse {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_check_in_date: Option<String>,
}

/// Get the member's streak state.
async fn get_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakResponse>> {
    let streak = state.streaks.get_streak(&user.user_id).await?;

    Ok(Json(StreakResponse {
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
        last_check_in_date: streak.last_check_in_date.map(|d| d.to_string()),
    }))
}

/// Reconciliation pass, called by the app on foreground.
///
/// Detects missed days and returns the possibly-reset streak for display.
async fn reconcile_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakResponse>> {
    let today = studio_today(state.config.studio_utc_offset_minutes);
    let streak = state.streaks.reconcile_on_open(&user.user_id, today).await?;

    Ok(Json(StreakResponse {
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
        last_check_in_date: streak.last_check_in_date.map(|d| d.to_string()),
    }))
}

// ─── Ranking ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RankingResponse {
    /// "YYYY-MM" of the ranked month
    pub month: String,
    pub entries: Vec<RankedUser>,
}

/// Get the current month's leaderboard.
async fn get_ranking(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RankingResponse>> {
    let today = studio_today(state.config.studio_utc_offset_minutes);
    let bounds = MonthBounds::containing(today);
    let entries = state.ranking.compute_monthly_ranking(bounds).await?;

    Ok(Json(RankingResponse {
        month: bounds.first.format("%Y-%m").to_string(),
        entries,
    }))
}

/// Get the member's own ranking entry.
async fn get_my_ranking(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserRankingData>> {
    let today = studio_today(state.config.studio_utc_offset_minutes);
    let bounds = MonthBounds::containing(today);
    let data = state
        .ranking
        .get_user_ranking_data(&user.user_id, bounds)
        .await?;

    Ok(Json(data))
}

// ─── WODs ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct WodResultSummary {
    pub display_name: String,
    pub score: WodScore,
    pub rx: bool,
}

#[derive(Serialize)]
pub struct WodResponse {
    pub wod_id: String,
    pub date: String,
    pub title: String,
    pub description: String,
    pub results: Vec<WodResultSummary>,
}

/// Get today's WOD and its result board.
async fn get_todays_wod(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WodResponse>> {
    let today = studio_today(state.config.studio_utc_offset_minutes);
    let wod = state
        .db
        .get_wod_for_date(today)
        .await?
        .ok_or_else(|| {
            crate::error::AppError::NotFound(format!("No WOD published for {}", today))
        })?;

    let results = state
        .db
        .results_for_wod(&wod.wod_id)
        .await?
        .into_iter()
        .map(|r| WodResultSummary {
            display_name: r.display_name,
            score: r.score,
            rx: r.rx,
        })
        .collect();

    Ok(Json(WodResponse {
        wod_id: wod.wod_id,
        date: wod.date.to_string(),
        title: wod.title,
        description: wod.description,
        results,
    }))
}

#[derive(Deserialize)]
struct SubmitWodResultRequest {
    score: WodScore,
    #[serde(default)]
    rx: bool,
}

#[derive(Serialize)]
pub struct SubmitWodResultResponse {
    pub success: bool,
    pub message: String,
}

/// Submit (or overwrite) the member's result for a WOD.
async fn submit_wod_result(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(wod_id): Path<String>,
    Json(payload): Json<SubmitWodResultRequest>,
) -> Result<Json<SubmitWodResultResponse>> {
    let wod = state
        .db
        .get_wod(&wod_id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("WOD {} not found", wod_id)))?;

    let member = state.booking.require_member(&user.user_id).await?;

    let result = crate::models::WodResult {
        user_id: member.user_id,
        wod_id: wod.wod_id,
        wod_date: wod.date,
        display_name: member.display_name,
        score: payload.score,
        rx: payload.rx,
        recorded_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.upsert_wod_result(&result).await?;

    Ok(Json(SubmitWodResultResponse {
        success: true,
        message: "Result logged.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param_default_and_explicit() {
        let default = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        assert_eq!(parse_date_param(None, default).unwrap(), default);
        assert_eq!(
            parse_date_param(Some("2024-01-31"), default).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        assert!(parse_date_param(Some("31/01/2024"), default).is_err());
    }

    #[test]
    fn test_milestone_copy_distinguishes_tiers() {
        let five = milestone_message(Milestone::FiveDayMultiple(5));
        let ten = milestone_message(Milestone::TenDayMultiple(10));

        assert!(five.contains('5'));
        assert!(ten.contains("10"));
        assert_ne!(five, ten);
    }
}
