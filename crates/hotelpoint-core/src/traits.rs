//! Store capability traits
//!
//! The booking core depends on these operations only, never on a concrete
//! persistence technology. Each trait is object safe so services hold
//! `Arc<dyn ...>` handles.

use crate::error::AppError;
use crate::models::{
    Booking, BookingStatus, DateRule, Hotel, PointTransaction, Room, RoomAvailability, User,
    UserRole,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Hotel and room catalog, read-only to the booking core
#[async_trait]
pub trait HotelStore: Send + Sync {
    async fn find_hotel(&self, id: Uuid) -> Result<Option<Hotel>, AppError>;

    async fn find_room(&self, id: Uuid) -> Result<Option<Room>, AppError>;

    async fn find_rooms_by_hotel(&self, hotel_id: Uuid) -> Result<Vec<Room>, AppError>;

    async fn count_hotels(&self) -> Result<i64, AppError>;

    /// Catalog writes; only the bootstrap seeder uses them
    async fn create_hotel(&self, hotel: &Hotel) -> Result<Hotel, AppError>;

    async fn create_room(&self, room: &Room) -> Result<Room, AppError>;
}

/// Date rule storage
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Rules whose date lies in `[start, end]`, ordered by date
    async fn find_rules_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DateRule>, AppError>;

    async fn find_rule_for_date(&self, date: NaiveDate) -> Result<Option<DateRule>, AppError>;

    async fn insert_rule(&self, rule: &DateRule) -> Result<DateRule, AppError>;

    /// Replace type, cost and name of an existing rule
    async fn update_rule(&self, rule: &DateRule) -> Result<DateRule, AppError>;

    /// Returns false when no rule had this id
    async fn delete_rule(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Per-room per-day availability overrides
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Overrides for `room_id` whose date lies in `[start, end]`, ordered by date
    async fn find_overrides_in_range(
        &self,
        room_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RoomAvailability>, AppError>;

    /// First override recorded for this exact day, if any
    async fn find_override_for_date(
        &self,
        room_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<RoomAvailability>, AppError>;

    async fn insert_override(&self, record: &RoomAvailability) -> Result<RoomAvailability, AppError>;

    async fn update_override(&self, record: &RoomAvailability) -> Result<RoomAvailability, AppError>;
}

/// Booking persistence
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError>;

    /// All bookings of a user, newest first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, AppError>;

    /// Non-cancelled, non-completed bookings whose stay ends after `now`
    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError>;

    /// Non-cancelled bookings of `room_id` overlapping `[check_in, check_out)`
    async fn find_overlapping_active(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError>;

    async fn count_overlapping_active(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<Booking, AppError>;

    /// Returns false when no booking had this id
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Page of bookings, newest first, with the total matching count
    async fn list(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, i64), AppError>;
}

/// Users, balances and the append-only point ledger
#[async_trait]
pub trait UserLedgerStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn create_user(&self, user: &User) -> Result<User, AppError>;

    async fn count_users_with_role(&self, role: UserRole) -> Result<i64, AppError>;

    /// Atomically add `delta` to the balance, returning the new balance
    async fn increment_balance(&self, user_id: Uuid, delta: i64) -> Result<i64, AppError>;

    async fn append_transaction(
        &self,
        transaction: &PointTransaction,
    ) -> Result<PointTransaction, AppError>;

    /// Transactions of a user, newest first
    async fn list_transactions(&self, user_id: Uuid) -> Result<Vec<PointTransaction>, AppError>;

    /// Apply `entry.amount` to the balance and record the entry.
    ///
    /// The default runs the two writes back to back; backends with
    /// transactions should make them one unit.
    async fn apply_entry(&self, entry: &PointTransaction) -> Result<i64, AppError> {
        let balance = self.increment_balance(entry.user_id, entry.amount).await?;
        self.append_transaction(entry).await?;
        Ok(balance)
    }

    /// Apply a negative `entry` only if the balance covers it.
    ///
    /// Returns the new balance, or `None` when the balance was too low. The
    /// default reads then writes and is open to the same race as a caller-side
    /// check; backends with a conditional update close it.
    async fn debit_if_sufficient(&self, entry: &PointTransaction) -> Result<Option<i64>, AppError> {
        let user = self
            .find_user(entry.user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(entry.user_id.to_string()))?;

        if user.point_balance + entry.amount < 0 {
            return Ok(None);
        }

        self.apply_entry(entry).await.map(Some)
    }
}

/// Capability bundle handed to the services at startup
#[derive(Clone)]
pub struct Stores {
    pub hotels: Arc<dyn HotelStore>,
    pub calendar: Arc<dyn CalendarStore>,
    pub availability: Arc<dyn AvailabilityStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub users: Arc<dyn UserLedgerStore>,
}

impl Stores {
    /// Bundle one backend that implements every store
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: HotelStore + CalendarStore + AvailabilityStore + BookingStore + UserLedgerStore + 'static,
    {
        Self {
            hotels: store.clone(),
            calendar: store.clone(),
            availability: store.clone(),
            bookings: store.clone(),
            users: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
