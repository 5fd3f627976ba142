//! Point ledger
//!
//! Every balance change goes through here and is paired with a
//! `PointTransaction`. The ledger does not check sign or sufficiency;
//! callers read `balance_of` first, or use `debit_if_sufficient`.

use hotelpoint_core::{
    models::{PointTransaction, TransactionKind},
    traits::UserLedgerStore,
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct PointLedger {
    store: Arc<dyn UserLedgerStore>,
}

impl PointLedger {
    pub fn new(store: Arc<dyn UserLedgerStore>) -> Self {
        Self { store }
    }

    /// Remove `amount` points, returning the new balance
    #[instrument(skip(self, reference))]
    pub async fn debit(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        reference: impl Into<String>,
    ) -> AppResult<i64> {
        let entry = PointTransaction::new(user_id, -amount, kind, reference);
        let balance = self.store.apply_entry(&entry).await?;

        info!(
            "Debited {} points from user {} ({}, ref {}), balance {}",
            amount, user_id, kind, entry.reference, balance
        );
        Ok(balance)
    }

    /// Add `amount` points, returning the new balance
    #[instrument(skip(self, reference))]
    pub async fn credit(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        reference: impl Into<String>,
    ) -> AppResult<i64> {
        let entry = PointTransaction::new(user_id, amount, kind, reference);
        let balance = self.store.apply_entry(&entry).await?;

        info!(
            "Credited {} points to user {} ({}, ref {}), balance {}",
            amount, user_id, kind, entry.reference, balance
        );
        Ok(balance)
    }

    /// Debit only when the balance covers `amount`.
    ///
    /// `None` means nothing was written.
    #[instrument(skip(self, reference))]
    pub async fn debit_if_sufficient(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        reference: impl Into<String>,
    ) -> AppResult<Option<i64>> {
        let entry = PointTransaction::new(user_id, -amount, kind, reference);
        let balance = self.store.debit_if_sufficient(&entry).await?;

        match balance {
            Some(balance) => info!(
                "Debited {} points from user {} ({}, ref {}), balance {}",
                amount, user_id, kind, entry.reference, balance
            ),
            None => debug!("Balance of user {} does not cover {} points", user_id, amount),
        }
        Ok(balance)
    }

    /// Record an `annual_grant`
    pub async fn grant(
        &self,
        user_id: Uuid,
        amount: i64,
        reference: impl Into<String>,
    ) -> AppResult<i64> {
        self.credit(user_id, amount, TransactionKind::AnnualGrant, reference)
            .await
    }

    pub async fn balance_of(&self, user_id: Uuid) -> AppResult<i64> {
        self.store
            .find_user(user_id)
            .await?
            .map(|user| user.point_balance)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    /// Transactions of a user, newest first
    pub async fn history_of(&self, user_id: Uuid) -> AppResult<Vec<PointTransaction>> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

        self.store.list_transactions(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotelpoint_core::models::User;
    use hotelpoint_db::MemoryStore;

    fn ledger_with_user(balance: i64) -> (PointLedger, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = store.insert_user(User {
            point_balance: balance,
            ..User::new("Ana".into(), "ana@example.com".into(), "hash".into())
        });
        (PointLedger::new(store), user.id)
    }

    #[tokio::test]
    async fn test_debit_and_credit_record_entries() {
        let (ledger, user_id) = ledger_with_user(10);

        let balance = ledger
            .debit(user_id, 4, TransactionKind::BookingDeduction, "b-1")
            .await
            .unwrap();
        assert_eq!(balance, 6);

        let balance = ledger
            .credit(user_id, 4, TransactionKind::BookingRefund, "b-1")
            .await
            .unwrap();
        assert_eq!(balance, 10);

        let history = ledger.history_of(user_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, TransactionKind::BookingRefund);
        assert_eq!(history[0].amount, 4);
        assert_eq!(history[1].amount, -4);
        assert_eq!(history[1].reference, "b-1");
    }

    #[tokio::test]
    async fn test_debit_does_not_check_sufficiency() {
        let (ledger, user_id) = ledger_with_user(1);
        let balance = ledger
            .debit(user_id, 3, TransactionKind::BookingDeduction, "b-2")
            .await
            .unwrap();
        assert_eq!(balance, -2);
    }

    #[tokio::test]
    async fn test_debit_if_sufficient() {
        let (ledger, user_id) = ledger_with_user(3);

        let refused = ledger
            .debit_if_sufficient(user_id, 4, TransactionKind::BookingDeduction, "b-3")
            .await
            .unwrap();
        assert_eq!(refused, None);
        assert!(ledger.history_of(user_id).await.unwrap().is_empty());

        let accepted = ledger
            .debit_if_sufficient(user_id, 3, TransactionKind::BookingDeduction, "b-4")
            .await
            .unwrap();
        assert_eq!(accepted, Some(0));
    }

    #[tokio::test]
    async fn test_grant() {
        let (ledger, user_id) = ledger_with_user(0);
        assert_eq!(ledger.grant(user_id, 24, "initial").await.unwrap(), 24);

        let history = ledger.history_of(user_id).await.unwrap();
        assert_eq!(history[0].kind, TransactionKind::AnnualGrant);
        assert_eq!(history[0].reference, "initial");
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (ledger, _) = ledger_with_user(0);
        let missing = Uuid::new_v4();

        assert!(matches!(
            ledger.balance_of(missing).await,
            Err(AppError::UserNotFound(_))
        ));
        assert!(matches!(
            ledger.history_of(missing).await,
            Err(AppError::UserNotFound(_))
        ));
    }
}
