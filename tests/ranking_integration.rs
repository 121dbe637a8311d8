// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly ranking integration tests against the emulator.
//!
//! The emulator database is shared across test files, so assertions are
//! scoped to the members seeded here rather than to absolute board
//! positions.

use boxbook::db::FirestoreDb;
use boxbook::models::{ClassSession, Member, MemberRole, Wod, WodResult, WodScore};
use boxbook::services::{BookingService, RankingService, StreakService};
use boxbook::time_utils::MonthBounds;
use chrono::NaiveDate;

mod common;
use common::{test_db, unique_id};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn active_member(user_id: &str) -> Member {
    Member {
        user_id: user_id.to_string(),
        email: None,
        display_name: format!("Rank {}", user_id),
        role: MemberRole::Member,
        active: true,
        created_at: "2024-01-01T00:00:00Z".to_string(),
        last_active: "2024-01-01T00:00:00Z".to_string(),
    }
}

/// Seed a checked-in reservation for `user_id` on `class_date`.
async fn seed_check_in(db: &FirestoreDb, user_id: &str, class_date: NaiveDate) {
    let booking = BookingService::new(db.clone(), StreakService::new(db.clone()));
    let class_id = unique_id("rank-class");

    db.upsert_class(&ClassSession {
        class_id: class_id.clone(),
        name: "WOD".to_string(),
        instructor: "Sam".to_string(),
        discipline: "crossfit".to_string(),
        level: "all".to_string(),
        date: class_date,
        start_time: "18:00".to_string(),
        end_time: "19:00".to_string(),
        capacity: 20,
        reservation_count: 0,
        created_at: "2024-06-01T00:00:00Z".to_string(),
    })
    .await
    .unwrap();

    booking.create_reservation(&class_id, user_id).await.unwrap();
    // Flip to checked-in at the db layer; the time gating is not under test
    db.check_in_reservation_atomic(&class_id, user_id, "2024-06-10T18:05:00Z")
        .await
        .unwrap();
}

/// Seed a WOD dated `wod_date` with a result for `user_id`.
async fn seed_wod_result(db: &FirestoreDb, user_id: &str, display_name: &str, wod_date: NaiveDate) {
    let wod_id = unique_id("rank-wod");

    db.upsert_wod(&Wod {
        wod_id: wod_id.clone(),
        date: wod_date,
        title: "Helen".to_string(),
        description: "3 rounds: 400m run, 21 KB swings, 12 pull-ups".to_string(),
        created_at: "2024-06-01T00:00:00Z".to_string(),
    })
    .await
    .unwrap();

    db.upsert_wod_result(&WodResult {
        user_id: user_id.to_string(),
        wod_id,
        wod_date,
        display_name: display_name.to_string(),
        score: WodScore::ForTime {
            minutes: 11,
            seconds: 32,
        },
        rx: true,
        recorded_at: "2024-06-10T19:05:00Z".to_string(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_monthly_ranking_scores_and_orders_members() {
    require_emulator!();

    let db = test_db().await;
    let ranking = RankingService::new(db.clone());
    let streaks = StreakService::new(db.clone());
    let bounds = MonthBounds::containing(date(2024, 6, 15));

    let alice = unique_id("alice");
    let bob = unique_id("bob");

    db.upsert_member(&active_member(&alice)).await.unwrap();
    db.upsert_member(&active_member(&bob)).await.unwrap();

    // Alice: 2 check-ins + 1 WOD, no streak bonus -> 2 + 2 = 4 points
    seed_check_in(&db, &alice, date(2024, 6, 3)).await;
    seed_check_in(&db, &alice, date(2024, 6, 10)).await;
    seed_wod_result(&db, &alice, "Alice", date(2024, 6, 10)).await;

    // Bob: 1 check-in + a 5-day streak -> 1 + 5 = 6 points
    seed_check_in(&db, &bob, date(2024, 6, 12)).await;
    for day in 8..=12 {
        streaks.record_check_in(&bob, date(2024, 6, day)).await.unwrap();
    }

    let board = ranking.compute_monthly_ranking(bounds).await.unwrap();

    // Global board invariants
    for pair in board.windows(2) {
        assert!(pair[1].points <= pair[0].points, "Board not sorted");
    }
    for (i, row) in board.iter().enumerate() {
        assert_eq!(row.rank, (i + 1) as u32, "Ranks not dense");
    }

    // Our members' scores and relative order
    let alice_row = board.iter().find(|r| r.user_id == alice).expect("Alice missing");
    let bob_row = board.iter().find(|r| r.user_id == bob).expect("Bob missing");

    assert_eq!(alice_row.check_ins, 2);
    assert_eq!(alice_row.wods, 1);
    assert_eq!(alice_row.points, 4);

    assert_eq!(bob_row.check_ins, 1);
    assert_eq!(bob_row.streak, 5);
    assert_eq!(bob_row.points, 6);

    assert!(bob_row.rank < alice_row.rank, "Bob should outrank Alice");
}

#[tokio::test]
async fn test_ranking_ignores_activity_outside_month() {
    require_emulator!();

    let db = test_db().await;
    let ranking = RankingService::new(db.clone());
    let bounds = MonthBounds::containing(date(2024, 6, 15));

    let carol = unique_id("carol");
    db.upsert_member(&active_member(&carol)).await.unwrap();

    // All of Carol's activity is in May
    seed_check_in(&db, &carol, date(2024, 5, 30)).await;
    seed_wod_result(&db, &carol, "Carol", date(2024, 5, 30)).await;

    let board = ranking.compute_monthly_ranking(bounds).await.unwrap();
    assert!(
        !board.iter().any(|r| r.user_id == carol),
        "Member with no June activity must be excluded"
    );
}

#[tokio::test]
async fn test_user_ranking_data_for_inactive_member_is_synthetic() {
    require_emulator!();

    let db = test_db().await;
    let ranking = RankingService::new(db.clone());
    let bounds = MonthBounds::containing(date(2024, 6, 15));

    let ghost = unique_id("ghost");

    let board = ranking.compute_monthly_ranking(bounds).await.unwrap();
    let data = ranking.get_user_ranking_data(&ghost, bounds).await.unwrap();

    // Other test files may add members concurrently, so the board can only
    // have grown between the two calls.
    assert!(data.rank as usize > board.len());
    assert_eq!(data.points, 0);
    assert!(data.points_to_next_rank >= 1);
}
