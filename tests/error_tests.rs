// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use boxbook::error::AppError;

fn status_of(err: AppError) -> StatusCode {
    err.into_response().status()
}

#[test]
fn test_business_rule_rejections_map_to_client_errors() {
    assert_eq!(
        status_of(AppError::CapacityExceeded("full".to_string())),
        StatusCode::CONFLICT
    );
    assert_eq!(
        status_of(AppError::DuplicateReservation("dup".to_string())),
        StatusCode::CONFLICT
    );
    assert_eq!(
        status_of(AppError::OutsideCheckInWindow("early".to_string())),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        status_of(AppError::NotFound("missing".to_string())),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        status_of(AppError::BadRequest("bad".to_string())),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn test_auth_errors_map_to_401_and_403() {
    assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(AppError::InvalidToken), StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(AppError::Forbidden), StatusCode::FORBIDDEN);
}

#[test]
fn test_store_failures_are_internal_and_opaque() {
    assert_eq!(
        status_of(AppError::Database("connection reset".to_string())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
