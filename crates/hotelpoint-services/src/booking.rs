//! Booking engine
//!
//! Orchestrates pricing, availability and the point ledger around the
//! booking lifecycle:
//!
//! - `create_booking` prices the stay, checks the room and the balance,
//!   persists a confirmed booking and debits the cost
//! - `cancel_booking` refunds the cost outside the cancellation window
//! - `update_booking_status` lets admins move bookings through the state
//!   machine, refunding on cancel and re-debiting on reactivation
//! - `delete_booking` refunds an active booking before removing it
//!
//! The overlap check and the insert are not atomic, so two concurrent
//! requests for the same room can both succeed. With the lenient debit mode
//! the same holds for one user's balance; strict mode debits through a
//! conditional update instead.

use crate::availability::AvailabilityChecker;
use crate::calendar::DateRuleCalendar;
use crate::constants::{MIN_STAY_NIGHTS, PAST_CHECK_IN_GRACE_DAYS};
use crate::ledger::PointLedger;
use crate::policy::BookingPolicy;
use chrono::{Duration, NaiveDate, Utc};
use hotelpoint_core::{
    models::{Booking, BookingStatus, CostQuote, LedgerEffect, Principal, Room, TransactionKind},
    traits::{BookingStore, HotelStore, PaginatedResponse, Pagination, PaginationMeta, Stores, UserLedgerStore},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Booking engine
#[derive(Clone)]
pub struct BookingEngine {
    calendar: DateRuleCalendar,
    availability: AvailabilityChecker,
    ledger: PointLedger,
    hotels: Arc<dyn HotelStore>,
    bookings: Arc<dyn BookingStore>,
    users: Arc<dyn UserLedgerStore>,
    policy: BookingPolicy,
}

impl BookingEngine {
    pub fn new(stores: &Stores, policy: BookingPolicy) -> Self {
        Self {
            calendar: DateRuleCalendar::new(stores.calendar.clone()),
            availability: AvailabilityChecker::new(
                stores.bookings.clone(),
                stores.availability.clone(),
                stores.hotels.clone(),
                policy.clone(),
            ),
            ledger: PointLedger::new(stores.users.clone()),
            hotels: stores.hotels.clone(),
            bookings: stores.bookings.clone(),
            users: stores.users.clone(),
            policy,
        }
    }

    pub fn calendar(&self) -> &DateRuleCalendar {
        &self.calendar
    }

    pub fn availability(&self) -> &AvailabilityChecker {
        &self.availability
    }

    pub fn ledger(&self) -> &PointLedger {
        &self.ledger
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Total point cost of a stay
    ///
    /// # Errors
    ///
    /// - `Validation` if check-in is after check-out or in the past
    /// - `RoomNotFound` if the room does not exist
    /// - `RoomUnavailable` if the room is booked or closed for the stay
    pub async fn calculate_cost(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<i64> {
        Ok(self.quote(room_id, check_in, check_out).await?.total)
    }

    /// Cost of a stay with the per-night breakdown
    #[instrument(skip(self))]
    pub async fn quote(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<CostQuote> {
        self.validate_dates(check_in, check_out)?;
        self.require_room(room_id).await?;

        if !self
            .availability
            .is_room_free(room_id, check_in, check_out)
            .await?
        {
            debug!("Room {} unavailable from {} to {}", room_id, check_in, check_out);
            return Err(AppError::RoomUnavailable);
        }

        let quote = CostQuote::from_nights(self.calendar.cost_for_range(check_in, check_out).await?);
        debug!(
            "Room {} costs {} points for {} nights",
            room_id,
            quote.total,
            quote.night_count()
        );
        Ok(quote)
    }

    /// Reserve a room and debit its cost
    ///
    /// On a failed debit the new booking is cancelled again and the debit
    /// error is returned.
    #[instrument(skip(self))]
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        hotel_id: Uuid,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<Booking> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

        self.hotels
            .find_hotel(hotel_id)
            .await?
            .ok_or_else(|| AppError::HotelNotFound(hotel_id.to_string()))?;

        let room = self.require_room(room_id).await?;
        if !room.belongs_to(hotel_id) {
            return Err(AppError::RoomHotelMismatch {
                room_id: room_id.to_string(),
                hotel_id: hotel_id.to_string(),
            });
        }

        self.validate_dates(check_in, check_out)?;
        if (check_out - check_in).num_days() < MIN_STAY_NIGHTS {
            return Err(AppError::Validation(
                "a stay must be at least one night".to_string(),
            ));
        }

        if !self
            .availability
            .is_room_free_for_user(room_id, user_id, check_in, check_out)
            .await?
        {
            warn!(
                "Room {} unavailable for user {} from {} to {}",
                room_id, user_id, check_in, check_out
            );
            return Err(AppError::RoomUnavailable);
        }

        let cost = CostQuote::from_nights(self.calendar.cost_for_range(check_in, check_out).await?).total;

        if !user.can_afford(cost) {
            warn!(
                "Insufficient balance for user {}: required {}, available {}",
                user_id, cost, user.point_balance
            );
            return Err(AppError::InsufficientBalance {
                required: cost,
                available: user.point_balance,
            });
        }

        let booking = Booking::new(
            user_id,
            hotel_id,
            room_id,
            self.policy.check_in_at(check_in)?,
            self.policy.check_out_at(check_out)?,
            cost,
        );
        let booking = self.bookings.create(&booking).await?;

        if let Err(e) = self
            .charge(user_id, cost, TransactionKind::BookingDeduction, booking.id)
            .await
        {
            self.compensate(booking.id).await;
            return Err(e);
        }

        info!(
            "Created booking {} for user {}: room {} from {} to {}, {} points",
            booking.id, user_id, room_id, check_in, check_out, cost
        );
        Ok(booking)
    }

    /// Cancel a booking on behalf of its owner or an admin and refund it
    #[instrument(skip(self))]
    pub async fn cancel_booking(&self, booking_id: Uuid, principal: &Principal) -> AppResult<Booking> {
        let booking = self.require_booking(booking_id).await?;

        if !principal.may_act_for(booking.user_id) {
            warn!(
                "User {} attempted to cancel booking {} of user {}",
                principal.user_id, booking_id, booking.user_id
            );
            return Err(AppError::Unauthorized(
                "only the owner or an admin can cancel this booking".to_string(),
            ));
        }

        match booking.status {
            BookingStatus::Cancelled => return Err(AppError::BookingAlreadyCancelled),
            BookingStatus::Completed => return Err(AppError::BookingAlreadyCompleted),
            BookingStatus::Pending | BookingStatus::Confirmed => {}
        }

        if !self.policy.may_cancel(booking.check_in, Utc::now()) {
            return Err(AppError::CancellationWindow {
                hours: self.policy.cancellation_window().num_hours(),
            });
        }

        let cancelled = self
            .bookings
            .update_status(booking_id, BookingStatus::Cancelled)
            .await?;

        self.ledger
            .credit(
                booking.user_id,
                booking.point_cost,
                TransactionKind::BookingRefund,
                booking_id.to_string(),
            )
            .await?;

        info!("Cancelled booking {} and refunded {} points", booking_id, booking.point_cost);
        Ok(cancelled)
    }

    /// Admin status change with the matching ledger effect
    ///
    /// Leaving `cancelled` re-checks and re-debits the cost; entering
    /// `cancelled` refunds it.
    #[instrument(skip(self))]
    pub async fn update_booking_status(&self, booking_id: Uuid, status: &str) -> AppResult<Booking> {
        let next = BookingStatus::from_str(status).ok_or_else(|| {
            AppError::Validation(format!(
                "invalid status '{}', expected one of pending, confirmed, completed, cancelled",
                status
            ))
        })?;

        let booking = self.require_booking(booking_id).await?;
        let current = booking.status;

        if !current.can_transition_to(next) {
            return Err(AppError::InvalidStatus(format!(
                "cannot move booking from {} to {}",
                current, next
            )));
        }

        match current.ledger_effect(next) {
            LedgerEffect::Reactivate => {
                let balance = self.ledger.balance_of(booking.user_id).await?;
                if balance < booking.point_cost {
                    warn!(
                        "Cannot reactivate booking {}: required {}, available {}",
                        booking_id, booking.point_cost, balance
                    );
                    return Err(AppError::InsufficientBalance {
                        required: booking.point_cost,
                        available: balance,
                    });
                }
                self.charge(
                    booking.user_id,
                    booking.point_cost,
                    TransactionKind::BookingReactivation,
                    booking_id,
                )
                .await?;
            }
            LedgerEffect::Refund => {
                self.ledger
                    .credit(
                        booking.user_id,
                        booking.point_cost,
                        TransactionKind::BookingRefund,
                        booking_id.to_string(),
                    )
                    .await?;
            }
            LedgerEffect::None => {}
        }

        let updated = self.bookings.update_status(booking_id, next).await?;
        info!("Booking {} moved from {} to {}", booking_id, current, next);
        Ok(updated)
    }

    /// Remove a booking, refunding it first unless already cancelled
    #[instrument(skip(self))]
    pub async fn delete_booking(&self, booking_id: Uuid) -> AppResult<()> {
        let booking = self.require_booking(booking_id).await?;

        if booking.status.is_active() {
            self.ledger
                .credit(
                    booking.user_id,
                    booking.point_cost,
                    TransactionKind::BookingDeletionRefund,
                    booking_id.to_string(),
                )
                .await?;
        }

        if !self.bookings.delete(booking_id).await? {
            return Err(AppError::BookingNotFound(booking_id.to_string()));
        }

        info!("Deleted booking {} ({})", booking_id, booking.status);
        Ok(())
    }

    /// Booking visible to its owner or an admin
    pub async fn get_booking(&self, booking_id: Uuid, principal: &Principal) -> AppResult<Booking> {
        let booking = self.require_booking(booking_id).await?;

        if !principal.may_act_for(booking.user_id) {
            return Err(AppError::Unauthorized(
                "only the owner or an admin can view this booking".to_string(),
            ));
        }
        Ok(booking)
    }

    pub async fn user_bookings(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        self.bookings.find_by_user(user_id).await
    }

    /// Bookings that still lie ahead or are in progress
    pub async fn active_bookings(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        self.bookings.find_active_by_user(user_id, Utc::now()).await
    }

    pub async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Booking>> {
        let (data, total) = self
            .bookings
            .list(status, pagination.limit(), pagination.offset())
            .await?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(total, pagination.page, pagination.per_page),
        })
    }

    fn validate_dates(&self, check_in: NaiveDate, check_out: NaiveDate) -> AppResult<()> {
        if check_in > check_out {
            return Err(AppError::Validation(
                "check-in date must not be after check-out date".to_string(),
            ));
        }

        if self.policy.start_of_day(check_in)? < Utc::now() - Duration::days(PAST_CHECK_IN_GRACE_DAYS) {
            return Err(AppError::Validation(
                "check-in date is in the past".to_string(),
            ));
        }

        Ok(())
    }

    async fn require_room(&self, room_id: Uuid) -> AppResult<Room> {
        self.hotels
            .find_room(room_id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()))
    }

    async fn require_booking(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))
    }

    /// Debit in the configured mode
    async fn charge(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        booking_id: Uuid,
    ) -> AppResult<i64> {
        if !self.policy.strict_balance() {
            return self
                .ledger
                .debit(user_id, amount, kind, booking_id.to_string())
                .await;
        }

        match self
            .ledger
            .debit_if_sufficient(user_id, amount, kind, booking_id.to_string())
            .await?
        {
            Some(balance) => Ok(balance),
            None => {
                let available = self.ledger.balance_of(user_id).await?;
                warn!(
                    "Conditional debit refused for user {}: required {}, available {}",
                    user_id, amount, available
                );
                Err(AppError::InsufficientBalance {
                    required: amount,
                    available,
                })
            }
        }
    }

    async fn compensate(&self, booking_id: Uuid) {
        match self
            .bookings
            .update_status(booking_id, BookingStatus::Cancelled)
            .await
        {
            Ok(_) => warn!("Cancelled booking {} after a failed debit", booking_id),
            Err(e) => error!(
                "Failed to cancel booking {} after a failed debit: {}",
                booking_id, e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotelpoint_core::models::{Hotel, UserRole, User};
    use hotelpoint_db::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> (Arc<MemoryStore>, BookingEngine, Room, User) {
        let (store, stores) = MemoryStore::new().into_stores();
        let hotel = store.insert_hotel(Hotel::new("Harbour View"));
        let room = store.insert_room(Room::new(hotel.id, "201", 2));
        let user = store.insert_user(User {
            point_balance: 10,
            ..User::new("Budi".into(), "budi@example.com".into(), "hash".into())
        });
        (store, BookingEngine::new(&stores, BookingPolicy::default()), room, user)
    }

    #[tokio::test]
    async fn test_quote_breakdown() {
        let (_, engine, room, _) = engine();

        // Friday, Saturday, Sunday nights
        let quote = engine.quote(room.id, date(2030, 6, 7), date(2030, 6, 10)).await.unwrap();
        assert_eq!(quote.total, 5);
        assert_eq!(quote.night_count(), 3);
    }

    #[tokio::test]
    async fn test_calculate_cost_rejects_reversed_and_past_dates() {
        let (_, engine, room, _) = engine();

        let err = engine
            .calculate_cost(room.id, date(2030, 6, 5), date(2030, 6, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = engine
            .calculate_cost(room.id, date(2020, 6, 3), date(2020, 6, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_calculate_cost_unknown_room() {
        let (_, engine, _, _) = engine();
        let err = engine
            .calculate_cost(Uuid::new_v4(), date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoomNotFound(_)));
    }

    #[tokio::test]
    async fn test_create_requires_one_night() {
        let (_, engine, room, user) = engine();
        let err = engine
            .create_booking(user.id, room.hotel_id, room.id, date(2030, 6, 3), date(2030, 6, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_room_of_other_hotel() {
        let (store, engine, room, user) = engine();
        let other = store.insert_hotel(Hotel::new("Elsewhere"));

        let err = engine
            .create_booking(user.id, other.id, room.id, date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoomHotelMismatch { .. }));
    }

    #[tokio::test]
    async fn test_booking_is_normalized_to_stay_hours() {
        let (_, engine, room, user) = engine();
        let booking = engine
            .create_booking(user.id, room.hotel_id, room.id, date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap();

        assert_eq!(booking.check_in.to_rfc3339(), "2030-06-03T14:00:00+00:00");
        assert_eq!(booking.check_out.to_rfc3339(), "2030-06-05T12:00:00+00:00");
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.point_cost, 2);
    }

    #[tokio::test]
    async fn test_get_booking_hides_other_users_bookings() {
        let (_, engine, room, user) = engine();
        let booking = engine
            .create_booking(user.id, room.hotel_id, room.id, date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap();

        let stranger = Principal::new(Uuid::new_v4(), UserRole::User);
        let admin = Principal::new(Uuid::new_v4(), UserRole::Admin);

        assert!(matches!(
            engine.get_booking(booking.id, &stranger).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(engine.get_booking(booking.id, &admin).await.is_ok());
        assert!(engine.get_booking(booking.id, &user.principal()).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_status_string() {
        let (_, engine, room, user) = engine();
        let booking = engine
            .create_booking(user.id, room.hotel_id, room.id, date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap();

        let err = engine
            .update_booking_status(booking.id, "archived")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_completed_booking_cannot_be_reopened() {
        let (_, engine, room, user) = engine();
        let booking = engine
            .create_booking(user.id, room.hotel_id, room.id, date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap();

        engine.update_booking_status(booking.id, "completed").await.unwrap();
        let err = engine
            .update_booking_status(booking.id, "confirmed")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn test_list_bookings_pagination() {
        let (_, engine, room, user) = engine();
        for day in [3, 5, 7] {
            engine
                .create_booking(
                    user.id,
                    room.hotel_id,
                    room.id,
                    date(2030, 6, day),
                    date(2030, 6, day + 1),
                )
                .await
                .unwrap();
        }

        let page = engine.list_bookings(None, &Pagination::new(1, 2)).await.unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);

        let cancelled = engine
            .list_bookings(Some(BookingStatus::Cancelled), &Pagination::new(1, 10))
            .await
            .unwrap();
        assert!(cancelled.data.is_empty());
    }
}
