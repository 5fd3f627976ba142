//! In-memory store
//!
//! Implements every store trait over a single `parking_lot::RwLock`. Used by
//! the test suites and by the server when no database URL is configured.
//! Locks are never held across an `.await`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hotelpoint_core::{
    models::{
        Booking, BookingStatus, DateRule, Hotel, PointTransaction, Room, RoomAvailability, User,
        UserRole,
    },
    traits::{AvailabilityStore, BookingStore, CalendarStore, HotelStore, Stores, UserLedgerStore},
    AppError, AppResult,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    hotels: HashMap<Uuid, Hotel>,
    rooms: HashMap<Uuid, Room>,
    users: HashMap<Uuid, User>,
    // Vecs keep insertion order; "newest first" is reverse order.
    bookings: Vec<Booking>,
    transactions: Vec<PointTransaction>,
    rules: Vec<DateRule>,
    overrides: Vec<RoomAvailability>,
}

/// Store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in an `Arc` and bundle as every store
    pub fn into_stores(self) -> (Arc<Self>, Stores) {
        let store = Arc::new(self);
        let stores = Stores::shared(store.clone());
        (store, stores)
    }

    pub fn insert_hotel(&self, hotel: Hotel) -> Hotel {
        self.state.write().hotels.insert(hotel.id, hotel.clone());
        hotel
    }

    pub fn insert_room(&self, room: Room) -> Room {
        self.state.write().rooms.insert(room.id, room.clone());
        room
    }

    /// Insert a user as-is, without a ledger entry for its balance
    pub fn insert_user(&self, user: User) -> User {
        self.state.write().users.insert(user.id, user.clone());
        user
    }

    /// Insert a booking without any availability or balance checks
    pub fn insert_booking(&self, booking: Booking) -> Booking {
        self.state.write().bookings.push(booking.clone());
        booking
    }

    /// Raw override insert; does not look for an existing record first
    pub fn push_override(&self, record: RoomAvailability) {
        self.state.write().overrides.push(record);
    }

    /// All overrides of a room on a day, duplicates included
    pub fn overrides_on(&self, room_id: Uuid, date: NaiveDate) -> Vec<RoomAvailability> {
        self.state
            .read()
            .overrides
            .iter()
            .filter(|r| r.room_id == room_id && r.date == date)
            .cloned()
            .collect()
    }

    pub fn booking_count(&self) -> usize {
        self.state.read().bookings.len()
    }
}

#[async_trait]
impl HotelStore for MemoryStore {
    async fn find_hotel(&self, id: Uuid) -> AppResult<Option<Hotel>> {
        Ok(self.state.read().hotels.get(&id).cloned())
    }

    async fn find_room(&self, id: Uuid) -> AppResult<Option<Room>> {
        Ok(self.state.read().rooms.get(&id).cloned())
    }

    async fn find_rooms_by_hotel(&self, hotel_id: Uuid) -> AppResult<Vec<Room>> {
        let mut rooms: Vec<Room> = self
            .state
            .read()
            .rooms
            .values()
            .filter(|r| r.hotel_id == hotel_id)
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rooms)
    }

    async fn count_hotels(&self) -> AppResult<i64> {
        Ok(self.state.read().hotels.len() as i64)
    }

    async fn create_hotel(&self, hotel: &Hotel) -> AppResult<Hotel> {
        Ok(self.insert_hotel(hotel.clone()))
    }

    async fn create_room(&self, room: &Room) -> AppResult<Room> {
        if !self.state.read().hotels.contains_key(&room.hotel_id) {
            return Err(AppError::HotelNotFound(room.hotel_id.to_string()));
        }
        Ok(self.insert_room(room.clone()))
    }
}

#[async_trait]
impl CalendarStore for MemoryStore {
    async fn find_rules_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DateRule>> {
        let mut rules: Vec<DateRule> = self
            .state
            .read()
            .rules
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .cloned()
            .collect();
        rules.sort_by_key(|r| r.date);
        Ok(rules)
    }

    async fn find_rule_for_date(&self, date: NaiveDate) -> AppResult<Option<DateRule>> {
        Ok(self
            .state
            .read()
            .rules
            .iter()
            .find(|r| r.date == date)
            .cloned())
    }

    async fn insert_rule(&self, rule: &DateRule) -> AppResult<DateRule> {
        let mut state = self.state.write();
        if state.rules.iter().any(|r| r.date == rule.date) {
            return Err(AppError::AlreadyExists(format!(
                "Date rule for {} already exists",
                rule.date
            )));
        }
        state.rules.push(rule.clone());
        Ok(rule.clone())
    }

    async fn update_rule(&self, rule: &DateRule) -> AppResult<DateRule> {
        let mut state = self.state.write();
        let existing = state
            .rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| AppError::DateRuleNotFound(rule.id.to_string()))?;

        existing.day_type = rule.day_type;
        existing.point_cost = rule.point_cost;
        existing.name = rule.name.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_rule(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write();
        let before = state.rules.len();
        state.rules.retain(|r| r.id != id);
        Ok(state.rules.len() != before)
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn find_overrides_in_range(
        &self,
        room_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<RoomAvailability>> {
        let mut records: Vec<RoomAvailability> = self
            .state
            .read()
            .overrides
            .iter()
            .filter(|r| r.room_id == room_id && r.date >= start && r.date <= end)
            .cloned()
            .collect();
        // Stable sort keeps insertion order within a day.
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    async fn find_override_for_date(
        &self,
        room_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<RoomAvailability>> {
        Ok(self
            .state
            .read()
            .overrides
            .iter()
            .find(|r| r.room_id == room_id && r.date == date)
            .cloned())
    }

    async fn insert_override(&self, record: &RoomAvailability) -> AppResult<RoomAvailability> {
        self.state.write().overrides.push(record.clone());
        Ok(record.clone())
    }

    async fn update_override(&self, record: &RoomAvailability) -> AppResult<RoomAvailability> {
        let mut state = self.state.write();
        let existing = state
            .overrides
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| {
                AppError::Conflict(format!("availability record {} was removed", record.id))
            })?;

        existing.available = record.available;
        existing.user_ids = record.user_ids.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn create(&self, booking: &Booking) -> AppResult<Booking> {
        debug!("Storing booking {}", booking.id);
        self.state.write().bookings.push(booking.clone());
        Ok(booking.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self
            .state
            .read()
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        Ok(self
            .state
            .read()
            .bookings
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .state
            .read()
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id && !b.status.is_terminal() && b.check_out > now)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.check_in);
        Ok(bookings)
    }

    async fn find_overlapping_active(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .state
            .read()
            .bookings
            .iter()
            .filter(|b| {
                b.room_id == room_id && b.status.is_active() && b.overlaps(check_in, check_out)
            })
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.check_in);
        Ok(bookings)
    }

    async fn count_overlapping_active(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> AppResult<i64> {
        let count = self
            .state
            .read()
            .bookings
            .iter()
            .filter(|b| {
                b.room_id == room_id && b.status.is_active() && b.overlaps(check_in, check_out)
            })
            .count();
        Ok(count as i64)
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        let mut state = self.state.write();
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        booking.status = status;
        Ok(booking.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write();
        let before = state.bookings.len();
        state.bookings.retain(|b| b.id != id);
        Ok(state.bookings.len() != before)
    }

    async fn list(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        let state = self.state.read();
        let matching: Vec<&Booking> = state
            .bookings
            .iter()
            .rev()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .collect();

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }
}

#[async_trait]
impl UserLedgerStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.read().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, user: &User) -> AppResult<User> {
        let mut state = self.state.write();
        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::AlreadyExists(format!(
                "User {} already exists",
                user.email
            )));
        }
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn count_users_with_role(&self, role: UserRole) -> AppResult<i64> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .filter(|u| u.role == role)
            .count() as i64)
    }

    async fn increment_balance(&self, user_id: Uuid, delta: i64) -> AppResult<i64> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

        user.point_balance += delta;
        user.updated_at = Utc::now();
        Ok(user.point_balance)
    }

    async fn append_transaction(&self, transaction: &PointTransaction) -> AppResult<PointTransaction> {
        self.state.write().transactions.push(transaction.clone());
        Ok(transaction.clone())
    }

    async fn list_transactions(&self, user_id: Uuid) -> AppResult<Vec<PointTransaction>> {
        Ok(self
            .state
            .read()
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn apply_entry(&self, entry: &PointTransaction) -> AppResult<i64> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(&entry.user_id)
            .ok_or_else(|| AppError::UserNotFound(entry.user_id.to_string()))?;

        user.point_balance += entry.amount;
        user.updated_at = Utc::now();
        let balance = user.point_balance;
        state.transactions.push(entry.clone());
        Ok(balance)
    }

    async fn debit_if_sufficient(&self, entry: &PointTransaction) -> AppResult<Option<i64>> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(&entry.user_id)
            .ok_or_else(|| AppError::UserNotFound(entry.user_id.to_string()))?;

        if user.point_balance + entry.amount < 0 {
            return Ok(None);
        }

        user.point_balance += entry.amount;
        user.updated_at = Utc::now();
        let balance = user.point_balance;
        state.transactions.push(entry.clone());
        Ok(Some(balance))
    }
}
