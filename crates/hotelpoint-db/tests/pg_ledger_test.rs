//! Ledger tests against a live PostgreSQL
//!
//! Run with `DATABASE_URL` set and `--ignored`.

use hotelpoint_core::config::DatabaseConfig;
use hotelpoint_core::models::{PointTransaction, TransactionKind, User};
use hotelpoint_core::traits::UserLedgerStore;
use hotelpoint_db::{create_pool, run_migrations, PgUserRepository};
use uuid::Uuid;

async fn repository() -> PgUserRepository {
    let config = DatabaseConfig {
        url: Some(
            std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/hotelpoint".to_string()),
        ),
        ..Default::default()
    };
    let pool = create_pool(&config).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    PgUserRepository::new(pool)
}

async fn user_with_balance(repo: &PgUserRepository, balance: i64) -> User {
    let email = format!("{}@example.com", Uuid::new_v4());
    let user = repo
        .create_user(&User::new("Ledger".into(), email, "hash".into()))
        .await
        .unwrap();
    repo.apply_entry(&PointTransaction::new(
        user.id,
        balance,
        TransactionKind::AnnualGrant,
        "initial",
    ))
    .await
    .unwrap();
    user
}

#[tokio::test]
#[ignore] // Requires database
async fn entry_moves_balance_and_history_together() {
    let repo = repository().await;
    let user = user_with_balance(&repo, 24).await;

    let balance = repo
        .apply_entry(&PointTransaction::new(
            user.id,
            -3,
            TransactionKind::BookingDeduction,
            Uuid::new_v4().to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(balance, 21);

    let history = repo.list_transactions(user.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].amount, -3);
    assert_eq!(history.iter().map(|t| t.amount).sum::<i64>(), 21);
}

#[tokio::test]
#[ignore] // Requires database
async fn conditional_debit_stops_at_zero() {
    let repo = repository().await;
    let user = user_with_balance(&repo, 3).await;

    let first = PointTransaction::new(user.id, -2, TransactionKind::BookingDeduction, "first");
    let second = PointTransaction::new(user.id, -2, TransactionKind::BookingDeduction, "second");

    let (a, b) = tokio::join!(
        repo.debit_if_sufficient(&first),
        repo.debit_if_sufficient(&second),
    );
    let applied: Vec<i64> = [a.unwrap(), b.unwrap()].into_iter().flatten().collect();

    assert_eq!(applied, vec![1]);
    let stored = repo.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.point_balance, 1);
    assert_eq!(repo.list_transactions(user.id).await.unwrap().len(), 2);
}

#[tokio::test]
#[ignore] // Requires database
async fn conditional_debit_for_missing_user() {
    let repo = repository().await;
    let err = repo
        .debit_if_sufficient(&PointTransaction::new(
            Uuid::new_v4(),
            -1,
            TransactionKind::BookingDeduction,
            "missing",
        ))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "user_not_found");
}
