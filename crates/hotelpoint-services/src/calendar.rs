//! Date rule calendar
//!
//! Resolves the point cost of each night of a stay. An exact-date rule wins
//! outright; otherwise Saturday and Sunday are weekend nights and every
//! other day is regular.

use chrono::NaiveDate;
use hotelpoint_core::{
    models::{DateRule, DayCost, DayType},
    traits::CalendarStore,
    AppError, AppResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Calendar of day-type rules
#[derive(Clone)]
pub struct DateRuleCalendar {
    store: Arc<dyn CalendarStore>,
}

impl DateRuleCalendar {
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }

    /// Cost and day type of a single date
    #[instrument(skip(self))]
    pub async fn cost_for_date(&self, date: NaiveDate) -> AppResult<DayCost> {
        let cost = match self.store.find_rule_for_date(date).await? {
            Some(rule) => DayCost::from(&rule),
            None => DayCost::by_weekday(date),
        };

        debug!(
            "{} is {} at {} points",
            date, cost.day_type, cost.point_cost
        );
        Ok(cost)
    }

    /// One entry per night in `[start, end)`; empty when `start >= end`
    #[instrument(skip(self))]
    pub async fn cost_for_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DayCost>> {
        if start >= end {
            return Ok(Vec::new());
        }

        let last_night = end.pred_opt().unwrap_or(start);
        let rules: HashMap<NaiveDate, DateRule> = self
            .store
            .find_rules_in_range(start, last_night)
            .await?
            .into_iter()
            .map(|rule| (rule.date, rule))
            .collect();

        let nights: Vec<DayCost> = start
            .iter_days()
            .take_while(|day| *day < end)
            .map(|day| match rules.get(&day) {
                Some(rule) => DayCost::from(rule),
                None => DayCost::by_weekday(day),
            })
            .collect();

        debug!(
            "Priced {} nights from {} with {} special dates",
            nights.len(),
            start,
            rules.len()
        );
        Ok(nights)
    }

    /// Create the rule for `date`, or replace the existing one in place
    #[instrument(skip(self, name))]
    pub async fn set_special_date(
        &self,
        date: NaiveDate,
        day_type: DayType,
        point_cost: i64,
        name: Option<String>,
    ) -> AppResult<DateRule> {
        if !DateRule::cost_in_range(point_cost) {
            return Err(AppError::Validation(format!(
                "point cost must be between 1 and 3, got {}",
                point_cost
            )));
        }

        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let rule = match self.store.find_rule_for_date(date).await? {
            Some(mut existing) => {
                existing.day_type = day_type;
                existing.point_cost = point_cost;
                existing.name = name;
                let updated = self.store.update_rule(&existing).await?;
                info!("Updated date rule {} for {}", updated.id, date);
                updated
            }
            None => {
                let created = self
                    .store
                    .insert_rule(&DateRule::new(date, day_type, point_cost, name))
                    .await?;
                info!("Created date rule {} for {}", created.id, date);
                created
            }
        };

        Ok(rule)
    }

    #[instrument(skip(self))]
    pub async fn delete_special_date(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_rule(id).await? {
            return Err(AppError::DateRuleNotFound(id.to_string()));
        }

        info!("Deleted date rule {}", id);
        Ok(())
    }

    /// Rules with a date in `[from, to]`
    pub async fn rules_in_range(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<DateRule>> {
        if from > to {
            return Err(AppError::Validation(
                "start date must not be after end date".to_string(),
            ));
        }
        self.store.find_rules_in_range(from, to).await
    }
}
