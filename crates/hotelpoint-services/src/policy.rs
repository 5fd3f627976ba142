//! Stay policy
//!
//! Converts date-only stays into the instants stored on a booking. Check-in
//! and check-out hours are local to the configured timezone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use hotelpoint_core::{config::BookingConfig, AppError, AppResult};

/// Resolved booking policy
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    timezone: Tz,
    check_in_hour: u32,
    check_out_hour: u32,
    cancellation_window: Duration,
    strict_balance: bool,
}

impl BookingPolicy {
    pub fn from_config(config: &BookingConfig) -> AppResult<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| AppError::Config(format!("unknown timezone '{}'", config.timezone)))?;

        if config.check_in_hour > 23 || config.check_out_hour > 23 {
            return Err(AppError::Config(
                "check-in and check-out hours must be between 0 and 23".to_string(),
            ));
        }

        // A stay ending on the day another starts must not overlap it
        if config.check_in_hour < config.check_out_hour {
            return Err(AppError::Config(format!(
                "check-in hour {} must not be earlier than check-out hour {}",
                config.check_in_hour, config.check_out_hour
            )));
        }

        if config.cancellation_window_hours < 0 {
            return Err(AppError::Config(
                "cancellation window must not be negative".to_string(),
            ));
        }

        Ok(Self {
            timezone,
            check_in_hour: config.check_in_hour,
            check_out_hour: config.check_out_hour,
            cancellation_window: Duration::hours(config.cancellation_window_hours),
            strict_balance: config.strict_balance,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn cancellation_window(&self) -> Duration {
        self.cancellation_window
    }

    pub fn strict_balance(&self) -> bool {
        self.strict_balance
    }

    /// Same policy with the debit mode switched
    pub fn with_strict_balance(mut self, strict: bool) -> Self {
        self.strict_balance = strict;
        self
    }

    /// Instant a stay starting on `date` begins
    pub fn check_in_at(&self, date: NaiveDate) -> AppResult<DateTime<Utc>> {
        self.local_instant(date, self.check_in_hour)
    }

    /// Instant a stay ending on `date` ends
    pub fn check_out_at(&self, date: NaiveDate) -> AppResult<DateTime<Utc>> {
        self.local_instant(date, self.check_out_hour)
    }

    /// Local midnight at the start of `date`
    pub fn start_of_day(&self, date: NaiveDate) -> AppResult<DateTime<Utc>> {
        self.local_instant(date, 0)
    }

    /// Whether `now` is still outside the window before `check_in`
    pub fn may_cancel(&self, check_in: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now <= check_in - self.cancellation_window
    }

    /// Resolve a local wall-clock time to an instant
    ///
    /// Ambiguous times take the earlier instant. A time skipped by a DST jump
    /// resolves to the first local time after the gap.
    fn local_instant(&self, date: NaiveDate, hour: u32) -> AppResult<DateTime<Utc>> {
        let naive = date
            .and_hms_opt(hour, 0, 0)
            .ok_or_else(|| AppError::InvalidInput(format!("invalid hour {}", hour)))?;

        let mut candidate = naive;
        while candidate - naive <= Duration::days(1) {
            match self.timezone.from_local_datetime(&candidate) {
                LocalResult::Single(local) => return Ok(local.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => return Ok(earliest.with_timezone(&Utc)),
                LocalResult::None => candidate += Duration::minutes(1),
            }
        }

        Err(AppError::InvalidInput(format!(
            "{} does not exist in {}",
            naive, self.timezone
        )))
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            check_in_hour: 14,
            check_out_hour: 12,
            cancellation_window: Duration::hours(24),
            strict_balance: false,
        }
    }
}
