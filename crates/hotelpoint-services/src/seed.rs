//! Bootstrap data
//!
//! Each step checks for existing data first, so seeding an already seeded
//! store changes nothing.

use crate::calendar::DateRuleCalendar;
use crate::ledger::PointLedger;
use chrono::{Datelike, NaiveDate, Utc};
use hotelpoint_auth::PasswordService;
use hotelpoint_core::{
    config::SeedConfig,
    models::{DayType, Hotel, Room, User, UserRole, INITIAL_GRANT_REFERENCE},
    traits::{HotelStore, Stores, UserLedgerStore},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const HOLIDAY_COST: i64 = 3;

struct SampleHotel {
    name: &'static str,
    address: &'static str,
    description: &'static str,
    rooms: &'static [(&'static str, i32)],
}

const SAMPLE_HOTELS: &[SampleHotel] = &[
    SampleHotel {
        name: "Grand Hotel Jakarta",
        address: "Jl. MH Thamrin No. 1, Jakarta",
        description: "Five-star hotel in central Jakarta",
        rooms: &[("Standard Room", 2), ("Deluxe Room", 2), ("Suite Room", 4)],
    },
    SampleHotel {
        name: "Beach Resort Bali",
        address: "Jl. Pantai Kuta No. 88, Bali",
        description: "Beachfront resort in Bali",
        rooms: &[
            ("Garden View Room", 2),
            ("Ocean View Room", 2),
            ("Beach Villa", 6),
        ],
    },
];

/// (month, day, name)
const HOLIDAYS: &[(u32, u32, &str)] = &[
    (1, 1, "New Year's Day"),
    (5, 1, "Labour Day"),
    (6, 1, "Pancasila Day"),
    (8, 17, "Independence Day"),
    (12, 25, "Christmas Day"),
];

/// What a seeding run created
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub hotels_created: usize,
    pub rooms_created: usize,
    pub holidays_created: usize,
    pub admin_created: bool,
}

pub struct Seeder {
    hotels: Arc<dyn HotelStore>,
    users: Arc<dyn UserLedgerStore>,
    calendar: DateRuleCalendar,
    ledger: PointLedger,
    passwords: PasswordService,
}

impl Seeder {
    pub fn new(stores: &Stores) -> Self {
        Self {
            hotels: stores.hotels.clone(),
            users: stores.users.clone(),
            calendar: DateRuleCalendar::new(stores.calendar.clone()),
            ledger: PointLedger::new(stores.users.clone()),
            passwords: PasswordService::new(),
        }
    }

    /// Seed the catalog, this year's holidays and the admin account
    pub async fn run(&self, config: &SeedConfig) -> AppResult<SeedReport> {
        let (hotels_created, rooms_created) = self.seed_hotels().await?;
        let holidays_created = self.seed_holidays(Utc::now().year()).await?;
        let admin_created = self.ensure_admin(config).await?;

        let report = SeedReport {
            hotels_created,
            rooms_created,
            holidays_created,
            admin_created,
        };
        info!("Seeding finished: {:?}", report);
        Ok(report)
    }

    /// Sample hotels and their rooms, skipped when any hotel exists
    #[instrument(skip(self))]
    pub async fn seed_hotels(&self) -> AppResult<(usize, usize)> {
        if self.hotels.count_hotels().await? > 0 {
            info!("Hotels already exist, skipping hotel seed");
            return Ok((0, 0));
        }

        let mut rooms_created = 0;
        for sample in SAMPLE_HOTELS {
            let mut hotel = Hotel::new(sample.name);
            hotel.address = Some(sample.address.to_string());
            hotel.description = Some(sample.description.to_string());
            let hotel = self.hotels.create_hotel(&hotel).await?;

            for (name, capacity) in sample.rooms {
                self.hotels
                    .create_room(&Room::new(hotel.id, *name, *capacity))
                    .await?;
                rooms_created += 1;
            }
        }

        info!(
            "Seeded {} hotels with {} rooms",
            SAMPLE_HOTELS.len(),
            rooms_created
        );
        Ok((SAMPLE_HOTELS.len(), rooms_created))
    }

    /// Holiday rules for `year`, skipped when the year already has rules
    #[instrument(skip(self))]
    pub async fn seed_holidays(&self, year: i32) -> AppResult<usize> {
        let (first, last) = match (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AppError::InvalidInput(format!("invalid year {}", year))),
        };

        if !self.calendar.rules_in_range(first, last).await?.is_empty() {
            info!("Date rules for {} already exist, skipping holiday seed", year);
            return Ok(0);
        }

        for (month, day, name) in HOLIDAYS {
            let date = NaiveDate::from_ymd_opt(year, *month, *day).ok_or_else(|| {
                AppError::InvalidInput(format!("invalid holiday {}-{}-{}", year, month, day))
            })?;
            self.calendar
                .set_special_date(date, DayType::Holiday, HOLIDAY_COST, Some(name.to_string()))
                .await?;
        }

        info!("Seeded {} holidays for {}", HOLIDAYS.len(), year);
        Ok(HOLIDAYS.len())
    }

    /// Create the admin account unless an admin already exists
    #[instrument(skip(self, config), fields(email = %config.admin_email))]
    pub async fn ensure_admin(&self, config: &SeedConfig) -> AppResult<bool> {
        if self.users.count_users_with_role(UserRole::Admin).await? > 0 {
            info!("Admin user already exists, skipping admin creation");
            return Ok(false);
        }

        let email = config.admin_email.trim().to_lowercase();
        if self.users.find_user_by_email(&email).await?.is_some() {
            warn!("{} is registered as a regular user, not creating an admin", email);
            return Ok(false);
        }

        let hash = self.passwords.hash_password(&config.admin_password)?;
        let mut admin = User::new(config.admin_name.clone(), email, hash);
        admin.role = UserRole::Admin;
        let admin = self.users.create_user(&admin).await?;

        if config.admin_points > 0 {
            self.ledger
                .grant(admin.id, config.admin_points, INITIAL_GRANT_REFERENCE)
                .await?;
        }

        info!("Admin user {} created", admin.id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotelpoint_auth::JwtService;
    use hotelpoint_db::MemoryStore;

    fn seeder() -> (Arc<MemoryStore>, Stores, Seeder) {
        let (store, stores) = MemoryStore::new().into_stores();
        let seeder = Seeder::new(&stores);
        (store, stores, seeder)
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let (_, stores, seeder) = seeder();
        let config = SeedConfig::default();

        let first = seeder.run(&config).await.unwrap();
        assert_eq!(first.hotels_created, 2);
        assert_eq!(first.rooms_created, 6);
        assert_eq!(first.holidays_created, 5);
        assert!(first.admin_created);

        let second = seeder.run(&config).await.unwrap();
        assert_eq!(second, SeedReport::default());

        assert_eq!(stores.hotels.count_hotels().await.unwrap(), 2);
        assert_eq!(
            stores.users.count_users_with_role(UserRole::Admin).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_holidays_cost_three_points() {
        let (_, stores, seeder) = seeder();
        seeder.seed_holidays(2031).await.unwrap();

        let calendar = DateRuleCalendar::new(stores.calendar.clone());
        let christmas = NaiveDate::from_ymd_opt(2031, 12, 25).unwrap();
        let cost = calendar.cost_for_date(christmas).await.unwrap();
        assert_eq!(cost.day_type, DayType::Holiday);
        assert_eq!(cost.point_cost, 3);

        let rules = calendar
            .rules_in_range(
                NaiveDate::from_ymd_opt(2031, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2031, 12, 31).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(rules.len(), 5);
    }

    #[tokio::test]
    async fn test_admin_can_log_in_with_grant() {
        let (_, stores, seeder) = seeder();
        let config = SeedConfig::default();
        assert!(seeder.ensure_admin(&config).await.unwrap());

        let jwt = Arc::new(JwtService::new("seed-test-secret-at-least-32-bytes", 3600));
        let identity = crate::IdentityService::new(stores.users.clone(), jwt, 24);
        let login = identity
            .login(&config.admin_email, &config.admin_password)
            .await
            .unwrap();
        assert_eq!(login.user.role, "admin");
        assert_eq!(login.user.point_balance, 100);

        let history = PointLedger::new(stores.users.clone())
            .history_of(login.user.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_regular_user_is_not_promoted() {
        let (store, stores, seeder) = seeder();
        let config = SeedConfig::default();
        store.insert_user(User::new(
            "Someone".to_string(),
            config.admin_email.clone(),
            "hash".to_string(),
        ));

        assert!(!seeder.ensure_admin(&config).await.unwrap());
        assert_eq!(
            stores.users.count_users_with_role(UserRole::Admin).await.unwrap(),
            0
        );
    }
}
