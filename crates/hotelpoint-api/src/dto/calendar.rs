//! Special date DTOs

use chrono::{DateTime, NaiveDate, Utc};
use hotelpoint_core::models::{DateRule, DayType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create or replace the rule for a date
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SpecialDateRequest {
    pub date: NaiveDate,

    /// "regular", "weekend" or "holiday"
    #[serde(rename = "type")]
    pub day_type: String,

    #[validate(range(min = 1, max = 3, message = "Point cost must be between 1 and 3"))]
    pub point_cost: i64,

    #[validate(length(max = 200))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateRuleResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub day_type: DayType,
    pub point_cost: i64,
    pub name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<DateRule> for DateRuleResponse {
    fn from(rule: DateRule) -> Self {
        Self {
            id: rule.id,
            date: rule.date,
            day_type: rule.day_type,
            point_cost: rule.point_cost,
            name: rule.name,
            updated_at: rule.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_date_request() {
        let req: SpecialDateRequest = serde_json::from_str(
            r#"{"date":"2030-12-25","type":"holiday","point_cost":3,"name":"Christmas"}"#,
        )
        .unwrap();
        assert_eq!(req.day_type, "holiday");
        assert!(req.validate().is_ok());

        let too_expensive = SpecialDateRequest {
            point_cost: 4,
            ..req
        };
        assert!(too_expensive.validate().is_err());
    }
}
