// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Members (profiles, active flag, coach role)
//! - Class sessions (schedule + capacity counter)
//! - Reservations (booking lifecycle)
//! - Streaks (per-member consecutive-day counter)
//! - WODs and WOD results
//!
//! The two contended documents (a class's `reservation_count` and a
//! member's `StreakState`) are only ever mutated inside Firestore
//! transactions, so concurrent requests cannot lose updates.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    CheckInOutcome, ClassSession, Member, Reservation, ReservationStatus, StreakState, Wod,
    WodResult,
};
use chrono::NaiveDate;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Member Operations ───────────────────────────────────────

    /// Get a member by user ID.
    pub async fn get_member(&self, user_id: &str) -> Result<Option<Member>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MEMBERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a member profile.
    pub async fn upsert_member(&self, member: &Member) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MEMBERS)
            .document_id(&member.user_id)
            .object(member)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All members flagged active, in stable (join-date) order.
    ///
    /// The ranking pass depends on this order being deterministic: members
    /// with equal points keep it.
    pub async fn list_active_members(&self) -> Result<Vec<Member>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MEMBERS)
            .filter(|q| q.field("active").eq(true))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Class Operations ────────────────────────────────────────

    /// Get a class session by ID.
    pub async fn get_class(&self, class_id: &str) -> Result<Option<ClassSession>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CLASSES)
            .obj()
            .one(class_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Publish or update a class session.
    pub async fn upsert_class(&self, class: &ClassSession) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CLASSES)
            .document_id(&class.class_id)
            .object(class)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// The schedule for one calendar day, ordered by start time.
    pub async fn list_classes_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ClassSession>, AppError> {
        let date = date.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CLASSES)
            .filter(move |q| q.field("date").eq(date.clone()))
            .order_by([(
                "start_time",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Reservation Operations ──────────────────────────────────

    /// Get the reservation document for a (class, member) pair.
    pub async fn get_reservation(
        &self,
        class_id: &str,
        user_id: &str,
    ) -> Result<Option<Reservation>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RESERVATIONS)
            .obj()
            .one(&Reservation::doc_id(class_id, user_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A member's reservations from `from` onwards, soonest first.
    ///
    /// Includes cancelled records; callers filter on status.
    pub async fn list_reservations_for_user(
        &self,
        user_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<Reservation>, AppError> {
        let user_id = user_id.to_string();
        let from = from.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RESERVATIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("class_date").greater_than_or_equal(from.clone()),
                ])
            })
            .order_by([(
                "class_date",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A member's checked-in reservations with class dates inside a range.
    ///
    /// This is the `check_ins` input of the monthly ranking.
    pub async fn checked_in_reservations_in_range(
        &self,
        user_id: &str,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<Reservation>, AppError> {
        let user_id = user_id.to_string();
        let first = first.to_string();
        let last = last.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RESERVATIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("status").eq("checked-in"),
                    q.field("class_date").greater_than_or_equal(first.clone()),
                    q.field("class_date").less_than_or_equal(last.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Booking Operations ───────────────────────────────

    /// Atomically create a reservation and bump the class counter.
    ///
    /// The capacity check and the counter increment happen inside one
    /// Firestore transaction: two concurrent bookings for the last spot
    /// cannot both succeed. Rejections are typed: `NotFound` for a missing
    /// class, `DuplicateReservation` when the member already holds an
    /// active reservation, `CapacityExceeded` when the class is full.
    pub async fn create_reservation_atomic(
        &self,
        class_id: &str,
        member: &Member,
        now: &str,
    ) -> Result<Reservation, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read the class and the (possibly cancelled) reservation document
        let mut class = self
            .get_class(class_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Class {} not found", class_id)))?;

        let existing = self.get_reservation(class_id, &member.user_id).await?;
        if existing.as_ref().is_some_and(|r| r.is_active()) {
            let _ = transaction.rollback().await;
            return Err(AppError::DuplicateReservation(format!(
                "Already booked for class {}",
                class_id
            )));
        }

        if class.is_full() {
            let _ = transaction.rollback().await;
            return Err(AppError::CapacityExceeded(format!(
                "Class {} is at capacity ({})",
                class_id, class.capacity
            )));
        }

        let reservation = Reservation {
            class_id: class.class_id.clone(),
            user_id: member.user_id.clone(),
            class_name: class.name.clone(),
            instructor: class.instructor.clone(),
            class_date: class.date,
            start_time: class.start_time.clone(),
            end_time: class.end_time.clone(),
            status: ReservationStatus::Confirmed,
            created_at: now.to_string(),
            checked_in_at: None,
        };
        class.reservation_count += 1;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::RESERVATIONS)
            .document_id(Reservation::doc_id(class_id, &member.user_id))
            .object(&reservation)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add reservation to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::CLASSES)
            .document_id(&class.class_id)
            .object(&class)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add class to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            class_id,
            user_id = %member.user_id,
            reservation_count = class.reservation_count,
            "Reservation created"
        );

        Ok(reservation)
    }

    /// Atomically cancel a reservation and release its spot.
    pub async fn cancel_reservation_atomic(
        &self,
        class_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut reservation = match self.get_reservation(class_id, user_id).await? {
            Some(r) if r.is_active() => r,
            _ => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!(
                    "No active reservation for class {}",
                    class_id
                )));
            }
        };

        let mut class = self
            .get_class(class_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Class {} not found", class_id)))?;

        reservation.status = ReservationStatus::Cancelled;
        // The counter never goes below zero even if it drifted
        class.reservation_count = class.reservation_count.saturating_sub(1);

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::RESERVATIONS)
            .document_id(Reservation::doc_id(class_id, user_id))
            .object(&reservation)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add reservation to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::CLASSES)
            .document_id(&class.class_id)
            .object(&class)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add class to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(class_id, user_id, "Reservation cancelled");

        Ok(())
    }

    /// Atomically flip a reservation to checked-in.
    ///
    /// Checking in twice is rejected, not silently accepted. This boundary
    /// is distinct from the streak engine's same-day idempotence.
    pub async fn check_in_reservation_atomic(
        &self,
        class_id: &str,
        user_id: &str,
        now: &str,
    ) -> Result<Reservation, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut reservation = match self.get_reservation(class_id, user_id).await? {
            Some(r) => r,
            None => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!(
                    "No reservation for class {}",
                    class_id
                )));
            }
        };

        match reservation.status {
            ReservationStatus::Confirmed => {}
            ReservationStatus::CheckedIn => {
                let _ = transaction.rollback().await;
                return Err(AppError::DuplicateReservation(format!(
                    "Already checked in to class {}",
                    class_id
                )));
            }
            ReservationStatus::Cancelled => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!(
                    "No active reservation for class {}",
                    class_id
                )));
            }
        }

        reservation.status = ReservationStatus::CheckedIn;
        reservation.checked_in_at = Some(now.to_string());

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::RESERVATIONS)
            .document_id(Reservation::doc_id(class_id, user_id))
            .object(&reservation)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add reservation to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(class_id, user_id, "Member checked in");

        Ok(reservation)
    }

    // ─── Streak Operations ───────────────────────────────────────

    /// Get a member's streak state.
    pub async fn get_streak(&self, user_id: &str) -> Result<Option<StreakState>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STREAKS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically apply a check-in to a member's streak.
    ///
    /// Read-modify-write inside a transaction: two concurrent check-ins on
    /// the same day cannot double-increment. The same-day no-op path rolls
    /// the transaction back without writing.
    pub async fn record_check_in_atomic(
        &self,
        user_id: &str,
        date: NaiveDate,
        now: &str,
    ) -> Result<CheckInOutcome, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut streak = self.get_streak(user_id).await?.unwrap_or_default();
        let outcome = streak.apply_check_in(date, now);

        if !outcome.advanced {
            tracing::debug!(user_id, %date, "Streak already counted today (idempotent skip)");
            let _ = transaction.rollback().await;
            return Ok(outcome);
        }

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::STREAKS)
            .document_id(user_id)
            .object(&streak)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add streak to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id,
            streak = streak.current_streak,
            longest = streak.longest_streak,
            "Streak advanced"
        );

        Ok(outcome)
    }

    /// Atomically run the app-open reconciliation pass on a member's streak.
    ///
    /// Returns the (possibly reset) state for immediate display.
    pub async fn reconcile_streak_atomic(
        &self,
        user_id: &str,
        today: NaiveDate,
        now: &str,
    ) -> Result<StreakState, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut streak = self.get_streak(user_id).await?.unwrap_or_default();

        if !streak.reconcile(today, now) {
            let _ = transaction.rollback().await;
            return Ok(streak);
        }

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::STREAKS)
            .document_id(user_id)
            .object(&streak)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add streak to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(user_id, %today, "Streak reset after missed day");

        Ok(streak)
    }

    // ─── WOD Operations ──────────────────────────────────────────

    /// Get a WOD by ID.
    pub async fn get_wod(&self, wod_id: &str) -> Result<Option<Wod>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::WODS)
            .obj()
            .one(wod_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The WOD published for a calendar day, if any.
    pub async fn get_wod_for_date(&self, date: NaiveDate) -> Result<Option<Wod>, AppError> {
        let date = date.to_string();
        let wods: Vec<Wod> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WODS)
            .filter(move |q| q.field("date").eq(date.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(wods.into_iter().next())
    }

    /// Publish or update a WOD.
    pub async fn upsert_wod(&self, wod: &Wod) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::WODS)
            .document_id(&wod.wod_id)
            .object(wod)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Store a member's WOD result (overwrites any previous submission).
    pub async fn upsert_wod_result(&self, result: &WodResult) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::WOD_RESULTS)
            .document_id(WodResult::doc_id(&result.wod_id, &result.user_id))
            .object(result)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// A member's WOD results with WOD dates inside a range.
    ///
    /// This is the `wods` input of the monthly ranking. The range query on
    /// the denormalized `wod_date` replaces a per-WOD existence probe.
    pub async fn wod_results_in_range(
        &self,
        user_id: &str,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<WodResult>, AppError> {
        let user_id = user_id.to_string();
        let first = first.to_string();
        let last = last.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WOD_RESULTS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("wod_date").greater_than_or_equal(first.clone()),
                    q.field("wod_date").less_than_or_equal(last.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All results submitted for one WOD, for the result board.
    pub async fn results_for_wod(&self, wod_id: &str) -> Result<Vec<WodResult>, AppError> {
        let wod_id = wod_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WOD_RESULTS)
            .filter(move |q| q.field("wod_id").eq(wod_id.clone()))
            .order_by([(
                "recorded_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
