//! Date rule repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hotelpoint_core::{
    models::{DateRule, DayType},
    traits::CalendarStore,
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

/// PostgreSQL implementation of CalendarStore
pub struct PgDateRuleRepository {
    pool: PgPool,
}

impl PgDateRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn parse_day_type(s: &str) -> DayType {
        DayType::from_str(s).unwrap_or_else(|| {
            warn!("Unknown day type in database: {}", s);
            DayType::Regular
        })
    }
}

#[async_trait]
impl CalendarStore for PgDateRuleRepository {
    #[instrument(skip(self))]
    async fn find_rules_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DateRule>> {
        debug!("Finding date rules between {} and {}", start, end);

        let rows = sqlx::query_as::<sqlx::Postgres, DateRuleRow>(
            r#"
            SELECT id, date, day_type, point_cost, name, created_at, updated_at
            FROM date_rules
            WHERE date >= $1 AND date <= $2
            ORDER BY date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding date rules: {}", e);
            AppError::Database(format!("Failed to fetch date rules: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_rule_for_date(&self, date: NaiveDate) -> AppResult<Option<DateRule>> {
        let row = sqlx::query_as::<sqlx::Postgres, DateRuleRow>(
            r#"
            SELECT id, date, day_type, point_cost, name, created_at, updated_at
            FROM date_rules
            WHERE date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding date rule for {}: {}", date, e);
            AppError::Database(format!("Failed to find date rule: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, rule), fields(date = %rule.date))]
    async fn insert_rule(&self, rule: &DateRule) -> AppResult<DateRule> {
        let row = sqlx::query_as::<sqlx::Postgres, DateRuleRow>(
            r#"
            INSERT INTO date_rules (id, date, day_type, point_cost, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, date, day_type, point_cost, name, created_at, updated_at
            "#,
        )
        .bind(rule.id)
        .bind(rule.date)
        .bind(rule.day_type.to_string())
        .bind(rule.point_cost)
        .bind(&rule.name)
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error inserting date rule: {}", e);
            if e.to_string().contains("unique constraint") {
                AppError::AlreadyExists(format!("Date rule for {} already exists", rule.date))
            } else {
                AppError::Database(format!("Failed to create date rule: {}", e))
            }
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, rule), fields(rule_id = %rule.id))]
    async fn update_rule(&self, rule: &DateRule) -> AppResult<DateRule> {
        let row = sqlx::query_as::<sqlx::Postgres, DateRuleRow>(
            r#"
            UPDATE date_rules
            SET day_type = $2,
                point_cost = $3,
                name = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, date, day_type, point_cost, name, created_at, updated_at
            "#,
        )
        .bind(rule.id)
        .bind(rule.day_type.to_string())
        .bind(rule.point_cost)
        .bind(&rule.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating date rule {}: {}", rule.id, e);
            AppError::Database(format!("Failed to update date rule: {}", e))
        })?
        .ok_or_else(|| AppError::DateRuleNotFound(rule.id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete_rule(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM date_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting date rule {}: {}", id, e);
                AppError::Database(format!("Failed to delete date rule: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DateRuleRow {
    id: Uuid,
    date: NaiveDate,
    day_type: String,
    point_cost: i64,
    name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DateRuleRow> for DateRule {
    fn from(row: DateRuleRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            day_type: PgDateRuleRepository::parse_day_type(&row.day_type),
            point_cost: row.point_cost,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
