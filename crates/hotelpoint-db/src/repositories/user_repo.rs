//! User and point ledger repository
//!
//! Balance changes and their ledger entries are written in one database
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hotelpoint_core::{
    models::{PointTransaction, TransactionKind, User, UserRole},
    traits::UserLedgerStore,
    AppError, AppResult,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// PostgreSQL implementation of UserLedgerStore
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn parse_role(s: &str) -> UserRole {
        UserRole::from_str(s).unwrap_or(UserRole::User)
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })
    }

    async fn insert_entry(
        tx: &mut Transaction<'static, Postgres>,
        entry: &PointTransaction,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO point_transactions (id, user_id, amount, kind, reference, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.amount)
        .bind(entry.kind.to_string())
        .bind(&entry.reference)
        .bind(entry.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            error!("Database error recording transaction {}: {}", entry.id, e);
            AppError::Database(format!("Failed to record point transaction: {}", e))
        })?;

        Ok(())
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })
    }
}

#[async_trait]
impl UserLedgerStore for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, UserRow>(
            r#"
            SELECT id, name, email, password_hash, point_balance, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user {}: {}", id, e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let row = sqlx::query_as::<sqlx::Postgres, UserRow>(
            r#"
            SELECT id, name, email, password_hash, point_balance, role, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user by email: {}", e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: &User) -> AppResult<User> {
        debug!("Creating user");

        let row = sqlx::query_as::<sqlx::Postgres, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, point_balance, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, email, password_hash, point_balance, role, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.point_balance)
        .bind(user.role.to_string())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating user: {}", e);
            if e.to_string().contains("unique constraint") {
                AppError::AlreadyExists(format!("User {} already exists", user.email))
            } else {
                AppError::Database(format!("Failed to create user: {}", e))
            }
        })?;

        info!("User created: {}", row.id);
        Ok(row.into())
    }

    async fn count_users_with_role(&self, role: UserRole) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting {} users: {}", role, e);
                AppError::Database(format!("Failed to count users: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn increment_balance(&self, user_id: Uuid, delta: i64) -> AppResult<i64> {
        debug!("Adjusting balance for user {} by {}", user_id, delta);

        let result: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET point_balance = point_balance + $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING point_balance
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating balance for user {}: {}", user_id, e);
            AppError::Database(format!("Failed to update balance: {}", e))
        })?;

        result
            .map(|(balance,)| balance)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    #[instrument(skip(self, transaction), fields(user_id = %transaction.user_id))]
    async fn append_transaction(
        &self,
        transaction: &PointTransaction,
    ) -> AppResult<PointTransaction> {
        let mut tx = self.begin().await?;
        Self::insert_entry(&mut tx, transaction).await?;
        Self::commit(tx).await?;

        Ok(transaction.clone())
    }

    #[instrument(skip(self))]
    async fn list_transactions(&self, user_id: Uuid) -> AppResult<Vec<PointTransaction>> {
        debug!("Listing point transactions of user: {}", user_id);

        let rows = sqlx::query_as::<sqlx::Postgres, TransactionRow>(
            r#"
            SELECT id, user_id, amount, kind, reference, created_at
            FROM point_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing transactions of user {}: {}", user_id, e);
            AppError::Database(format!("Failed to fetch point transactions: {}", e))
        })?;

        Ok(rows.into_iter().filter_map(TransactionRow::into_model).collect())
    }

    #[instrument(skip(self, entry), fields(user_id = %entry.user_id, amount = entry.amount, kind = %entry.kind))]
    async fn apply_entry(&self, entry: &PointTransaction) -> AppResult<i64> {
        let mut tx = self.begin().await?;

        let balance: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET point_balance = point_balance + $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING point_balance
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.amount)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error applying ledger entry: {}", e);
            AppError::Database(format!("Failed to update balance: {}", e))
        })?;

        let (balance,) = balance.ok_or_else(|| AppError::UserNotFound(entry.user_id.to_string()))?;

        Self::insert_entry(&mut tx, entry).await?;
        Self::commit(tx).await?;

        debug!("Ledger entry applied, new balance {}", balance);
        Ok(balance)
    }

    #[instrument(skip(self, entry), fields(user_id = %entry.user_id, amount = entry.amount))]
    async fn debit_if_sufficient(&self, entry: &PointTransaction) -> AppResult<Option<i64>> {
        let mut tx = self.begin().await?;

        // The floor is checked by the UPDATE itself, so concurrent debits serialize on the row.
        let balance: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET point_balance = point_balance + $2,
                updated_at = NOW()
            WHERE id = $1
              AND point_balance + $2 >= 0
            RETURNING point_balance
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.amount)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error applying conditional debit: {}", e);
            AppError::Database(format!("Failed to update balance: {}", e))
        })?;

        let Some((balance,)) = balance else {
            // Either the user is gone or the balance is short; tell them apart.
            drop(tx);
            return match self.find_user(entry.user_id).await? {
                Some(_) => {
                    warn!("Conditional debit refused: insufficient balance");
                    Ok(None)
                }
                None => Err(AppError::UserNotFound(entry.user_id.to_string())),
            };
        };

        Self::insert_entry(&mut tx, entry).await?;
        Self::commit(tx).await?;

        Ok(Some(balance))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    point_balance: i64,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            point_balance: row.point_balance,
            role: PgUserRepository::parse_role(&row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: Uuid,
    amount: i64,
    kind: String,
    reference: String,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_model(self) -> Option<PointTransaction> {
        let Some(kind) = TransactionKind::from_str(&self.kind) else {
            warn!("Skipping transaction {} with unknown kind {}", self.id, self.kind);
            return None;
        };

        Some(PointTransaction {
            id: self.id,
            user_id: self.user_id,
            amount: self.amount,
            kind,
            reference: self.reference,
            created_at: self.created_at,
        })
    }
}
