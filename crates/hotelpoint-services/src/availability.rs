//! Room availability
//!
//! A room is free for a stay when no non-cancelled booking overlaps it and
//! no day of the stay is closed by an override. Overrides with an allowed
//! user set additionally restrict who may book that day.

use crate::policy::BookingPolicy;
use chrono::NaiveDate;
use hotelpoint_core::{
    models::RoomAvailability,
    traits::{AvailabilityStore, BookingStore, HotelStore},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Availability checker and override writer
#[derive(Clone)]
pub struct AvailabilityChecker {
    bookings: Arc<dyn BookingStore>,
    availability: Arc<dyn AvailabilityStore>,
    hotels: Arc<dyn HotelStore>,
    policy: BookingPolicy,
}

impl AvailabilityChecker {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        availability: Arc<dyn AvailabilityStore>,
        hotels: Arc<dyn HotelStore>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            bookings,
            availability,
            hotels,
            policy,
        }
    }

    /// Free for anyone: no overlapping booking and no closed day
    #[instrument(skip(self))]
    pub async fn is_room_free(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<bool> {
        self.check(room_id, None, check_in, check_out).await
    }

    /// Free for `user_id`: also honours allowed-user sets
    #[instrument(skip(self))]
    pub async fn is_room_free_for_user(
        &self,
        room_id: Uuid,
        user_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<bool> {
        self.check(room_id, Some(user_id), check_in, check_out).await
    }

    async fn check(
        &self,
        room_id: Uuid,
        user_id: Option<Uuid>,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<bool> {
        let starts_at = self.policy.check_in_at(check_in)?;
        let ends_at = self.policy.check_out_at(check_out)?;

        let conflicts = self
            .bookings
            .count_overlapping_active(room_id, starts_at, ends_at)
            .await?;
        if conflicts > 0 {
            debug!("Room {} has {} overlapping bookings", room_id, conflicts);
            return Ok(false);
        }

        if check_in >= check_out {
            return Ok(true);
        }

        let last_night = check_out.pred_opt().unwrap_or(check_in);
        let overrides = self
            .availability
            .find_overrides_in_range(room_id, check_in, last_night)
            .await?;

        let closed = overrides.iter().find(|record| match user_id {
            Some(user_id) => !record.permits(user_id),
            None => record.is_blocked(),
        });

        if let Some(record) = closed {
            debug!("Room {} is closed on {}", room_id, record.date);
            return Ok(false);
        }

        Ok(true)
    }

    /// Apply one override to every day in `[from, to]`.
    ///
    /// A day that already has a record is updated in place; otherwise a new
    /// record is inserted.
    #[instrument(skip(self, user_ids))]
    pub async fn set_availability(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        available: bool,
        user_ids: Vec<Uuid>,
    ) -> AppResult<Vec<RoomAvailability>> {
        if from > to {
            return Err(AppError::Validation(
                "from date must not be after to date".to_string(),
            ));
        }
        self.require_room(room_id).await?;

        let mut user_ids = user_ids;
        user_ids.sort();
        user_ids.dedup();

        let mut written = Vec::new();
        for day in from.iter_days().take_while(|day| *day <= to) {
            let record = match self.availability.find_override_for_date(room_id, day).await? {
                Some(mut existing) => {
                    existing.available = available;
                    existing.user_ids = user_ids.clone();
                    self.availability.update_override(&existing).await?
                }
                None => {
                    let record = RoomAvailability::new(room_id, day, available, user_ids.clone());
                    self.availability.insert_override(&record).await?
                }
            };
            written.push(record);
        }

        info!(
            "Set availability of room {} from {} to {}: available={}, {} allowed users",
            room_id,
            from,
            to,
            available,
            user_ids.len()
        );
        Ok(written)
    }

    /// Override records of a room in `[from, to]`
    pub async fn availability_in_range(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<RoomAvailability>> {
        if from > to {
            return Err(AppError::Validation(
                "from date must not be after to date".to_string(),
            ));
        }
        self.require_room(room_id).await?;
        self.availability.find_overrides_in_range(room_id, from, to).await
    }

    async fn require_room(&self, room_id: Uuid) -> AppResult<()> {
        self.hotels
            .find_room(room_id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotelpoint_core::models::{Booking, BookingStatus, Hotel, Room};
    use hotelpoint_db::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        checker: AvailabilityChecker,
        room: Room,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let hotel = store.insert_hotel(Hotel::new("Seaside"));
        let room = store.insert_room(Room::new(hotel.id, "101", 2));
        let checker = AvailabilityChecker::new(
            store.clone(),
            store.clone(),
            store.clone(),
            BookingPolicy::default(),
        );
        Fixture {
            store,
            checker,
            room,
        }
    }

    fn book(f: &Fixture, check_in: NaiveDate, check_out: NaiveDate) -> Booking {
        let policy = BookingPolicy::default();
        f.store.insert_booking(Booking::new(
            Uuid::new_v4(),
            f.room.hotel_id,
            f.room.id,
            policy.check_in_at(check_in).unwrap(),
            policy.check_out_at(check_out).unwrap(),
            2,
        ))
    }

    #[tokio::test]
    async fn test_room_without_records_is_free() {
        let f = fixture();
        assert!(f
            .checker
            .is_room_free(f.room.id, date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_overlap_and_back_to_back() {
        let f = fixture();
        book(&f, date(2030, 6, 3), date(2030, 6, 5));

        // Overlaps the night of the 4th
        assert!(!f
            .checker
            .is_room_free(f.room.id, date(2030, 6, 4), date(2030, 6, 6))
            .await
            .unwrap());

        // Starts the day the previous stay ends
        assert!(f
            .checker
            .is_room_free(f.room.id, date(2030, 6, 5), date(2030, 6, 7))
            .await
            .unwrap());

        // Ends the day the previous stay starts
        assert!(f
            .checker
            .is_room_free(f.room.id, date(2030, 6, 1), date(2030, 6, 3))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_cancelled_booking_never_blocks() {
        let f = fixture();
        let booking = book(&f, date(2030, 6, 3), date(2030, 6, 5));
        f.store
            .update_status(booking.id, BookingStatus::Cancelled)
            .await
            .unwrap();

        assert!(f
            .checker
            .is_room_free(f.room.id, date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_blocked_day_closes_the_room() {
        let f = fixture();
        f.checker
            .set_availability(f.room.id, date(2030, 6, 4), date(2030, 6, 4), false, vec![])
            .await
            .unwrap();

        assert!(!f
            .checker
            .is_room_free(f.room.id, date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap());

        // The blocked day is the check-out day, not a night of the stay
        assert!(f
            .checker
            .is_room_free(f.room.id, date(2030, 6, 2), date(2030, 6, 4))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_restricted_day() {
        let f = fixture();
        let allowed = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        f.checker
            .set_availability(f.room.id, date(2030, 6, 3), date(2030, 6, 4), true, vec![allowed])
            .await
            .unwrap();

        let (ci, co) = (date(2030, 6, 3), date(2030, 6, 5));
        assert!(f.checker.is_room_free_for_user(f.room.id, allowed, ci, co).await.unwrap());
        assert!(!f.checker.is_room_free_for_user(f.room.id, stranger, ci, co).await.unwrap());

        // The user-agnostic check only looks at closed days
        assert!(f.checker.is_room_free(f.room.id, ci, co).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_allowed_set_is_unrestricted() {
        let f = fixture();
        f.checker
            .set_availability(f.room.id, date(2030, 6, 3), date(2030, 6, 4), true, vec![])
            .await
            .unwrap();

        assert!(f
            .checker
            .is_room_free_for_user(f.room.id, Uuid::new_v4(), date(2030, 6, 3), date(2030, 6, 5))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_set_availability_updates_existing_day() {
        let f = fixture();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let day = date(2030, 6, 10);

        f.checker
            .set_availability(f.room.id, day, day, true, vec![first])
            .await
            .unwrap();
        f.checker
            .set_availability(f.room.id, day, day, true, vec![second])
            .await
            .unwrap();

        let records = f.store.overrides_on(f.room.id, day);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_ids, vec![second]);
    }

    #[tokio::test]
    async fn test_duplicate_day_records() {
        let f = fixture();
        let guest = Uuid::new_v4();
        let day = date(2030, 6, 10);

        let first = RoomAvailability::new(f.room.id, day, true, vec![]);
        let stale = RoomAvailability::new(f.room.id, day, false, vec![]);
        f.store.push_override(first.clone());
        f.store.push_override(stale.clone());

        f.checker
            .set_availability(f.room.id, day, day, true, vec![guest])
            .await
            .unwrap();

        // Only the first record for the day is rewritten
        let records = f.store.overrides_on(f.room.id, day);
        assert_eq!(records.len(), 2);
        let updated = records.iter().find(|r| r.id == first.id).unwrap();
        assert!(updated.available);
        assert_eq!(updated.user_ids, vec![guest]);
        let untouched = records.iter().find(|r| r.id == stale.id).unwrap();
        assert!(!untouched.available);
        assert!(untouched.user_ids.is_empty());

        // Any closed record still blocks the night
        assert!(!f
            .checker
            .is_room_free_for_user(f.room.id, guest, day, date(2030, 6, 11))
            .await
            .unwrap());
        assert!(!f
            .checker
            .is_room_free(f.room.id, day, date(2030, 6, 11))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_set_availability_covers_inclusive_range() {
        let f = fixture();
        let written = f
            .checker
            .set_availability(f.room.id, date(2030, 6, 1), date(2030, 6, 3), false, vec![])
            .await
            .unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(written[2].date, date(2030, 6, 3));
    }

    #[tokio::test]
    async fn test_set_availability_validation() {
        let f = fixture();

        let err = f
            .checker
            .set_availability(f.room.id, date(2030, 6, 5), date(2030, 6, 1), true, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = f
            .checker
            .set_availability(Uuid::new_v4(), date(2030, 6, 1), date(2030, 6, 1), true, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoomNotFound(_)));
    }
}
