// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes for coaches: publishing class sessions and WODs.
//!
//! The mobile app's admin console calls these; they require the
//! authenticated member to carry the coach role.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ClassSession, Wod};
use crate::time_utils::{format_utc_rfc3339, parse_hhmm};
use crate::AppState;
use axum::{
    extract::State,
    routing::post,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Admin routes (coach role required on top of authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/classes", post(create_class))
        .route("/api/admin/wods", post(create_wod))
}

async fn require_coach(state: &AppState, user: &AuthUser) -> Result<()> {
    let member = state.booking.require_member(&user.user_id).await?;
    if !member.is_coach() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 64))]
    pub class_id: String,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(min = 1, max = 80))]
    pub instructor: String,
    #[validate(length(min = 1, max = 40))]
    pub discipline: String,
    #[validate(length(min = 1, max = 40))]
    pub level: String,
    pub date: NaiveDate,
    /// "HH:MM" on the studio's wall clock
    pub start_time: String,
    pub end_time: String,
    #[validate(range(min = 1, max = 200))]
    pub capacity: u32,
}

#[derive(Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub message: String,
}

/// Publish (or update) a class session.
///
/// Updating an existing session preserves its reservation counter.
async fn create_class(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<Json<PublishResponse>> {
    require_coach(&state, &user).await?;

    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if parse_hhmm(&payload.start_time).is_none() || parse_hhmm(&payload.end_time).is_none() {
        return Err(AppError::BadRequest(
            "start_time and end_time must be HH:MM".to_string(),
        ));
    }

    let reservation_count = state
        .db
        .get_class(&payload.class_id)
        .await?
        .map(|existing| existing.reservation_count)
        .unwrap_or(0);

    let class = ClassSession {
        class_id: payload.class_id,
        name: payload.name,
        instructor: payload.instructor,
        discipline: payload.discipline,
        level: payload.level,
        date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        capacity: payload.capacity,
        reservation_count,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.upsert_class(&class).await?;

    tracing::info!(class_id = %class.class_id, date = %class.date, "Class published");

    Ok(Json(PublishResponse {
        success: true,
        message: format!("Class {} published for {}", class.class_id, class.date),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWodRequest {
    #[validate(length(min = 1, max = 64))]
    pub wod_id: String,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 80))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
}

/// Publish (or update) the WOD for a date.
///
/// One WOD per calendar day: publishing a second WOD with a different ID
/// for the same date is rejected.
async fn create_wod(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateWodRequest>,
) -> Result<Json<PublishResponse>> {
    require_coach(&state, &user).await?;

    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if let Some(existing) = state.db.get_wod_for_date(payload.date).await? {
        if existing.wod_id != payload.wod_id {
            return Err(AppError::BadRequest(format!(
                "A WOD ({}) is already published for {}",
                existing.wod_id, payload.date
            )));
        }
    }

    let wod = Wod {
        wod_id: payload.wod_id,
        date: payload.date,
        title: payload.title,
        description: payload.description,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.upsert_wod(&wod).await?;

    tracing::info!(wod_id = %wod.wod_id, date = %wod.date, "WOD published");

    Ok(Json(PublishResponse {
        success: true,
        message: format!("WOD {} published for {}", wod.wod_id, wod.date),
    }))
}
