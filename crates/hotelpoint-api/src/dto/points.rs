//! Point balance and history DTOs

use chrono::{DateTime, Utc};
use hotelpoint_core::models::{PointTransaction, TransactionKind};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub user_id: Uuid,
    pub point_balance: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

impl From<PointTransaction> for TransactionResponse {
    fn from(tx: PointTransaction) -> Self {
        Self {
            id: tx.id,
            amount: tx.amount,
            kind: tx.kind,
            reference: tx.reference,
            created_at: tx.created_at,
        }
    }
}
