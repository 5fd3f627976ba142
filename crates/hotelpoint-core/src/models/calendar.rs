//! Date rule models
//!
//! A date rule overrides the default point cost of one calendar day.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lowest point cost a day can carry
pub const MIN_DAY_COST: i64 = 1;

/// Highest point cost a day can carry
pub const MAX_DAY_COST: i64 = 3;

/// Day type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    #[default]
    Regular,
    Weekend,
    Holiday,
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayType::Regular => write!(f, "regular"),
            DayType::Weekend => write!(f, "weekend"),
            DayType::Holiday => write!(f, "holiday"),
        }
    }
}

impl DayType {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "regular" => Some(DayType::Regular),
            "weekend" => Some(DayType::Weekend),
            "holiday" => Some(DayType::Holiday),
            _ => None,
        }
    }

    /// Cost a day of this type has when no rule says otherwise
    pub fn default_cost(&self) -> i64 {
        match self {
            DayType::Regular => 1,
            DayType::Weekend => 2,
            DayType::Holiday => 3,
        }
    }

    /// Weekday-based classification used when a date has no rule
    pub fn for_weekday(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Regular,
        }
    }
}

/// Admin-authored override for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRule {
    pub id: Uuid,
    pub date: NaiveDate,
    pub day_type: DayType,
    pub point_cost: i64,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DateRule {
    pub fn new(date: NaiveDate, day_type: DayType, point_cost: i64, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            date,
            day_type,
            point_cost,
            name,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn cost_in_range(cost: i64) -> bool {
        (MIN_DAY_COST..=MAX_DAY_COST).contains(&cost)
    }
}

/// Resolved price of one night
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCost {
    pub date: NaiveDate,
    pub point_cost: i64,
    pub day_type: DayType,
    pub name: Option<String>,
}

impl DayCost {
    /// Weekday default for a date without a rule
    pub fn by_weekday(date: NaiveDate) -> Self {
        let day_type = DayType::for_weekday(date);
        Self {
            date,
            point_cost: day_type.default_cost(),
            day_type,
            name: None,
        }
    }
}

impl From<&DateRule> for DayCost {
    fn from(rule: &DateRule) -> Self {
        Self {
            date: rule.date,
            point_cost: rule.point_cost,
            day_type: rule.day_type,
            name: rule.name.clone(),
        }
    }
}

/// Priced stay: total plus one entry per night
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostQuote {
    pub total: i64,
    pub nights: Vec<DayCost>,
}

impl CostQuote {
    pub fn from_nights(nights: Vec<DayCost>) -> Self {
        let total = nights.iter().map(|n| n.point_cost).sum();
        Self { total, nights }
    }

    pub fn night_count(&self) -> usize {
        self.nights.len()
    }
}
