use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub account_source_id: String,
    pub account_destination: String,
    pub bank_destination_id: String,
    pub bank_destination_name: String,
    pub amount: Decimal,
    pub description: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn select_base() -> &'static str {
        include_str!("../../../SQL/transactions/select_base.sql")
    }

    #[inline]
    pub fn insert_query() -> &'static str {
        include_str!("../../../SQL/transactions/insert.sql")
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_source_id: String,
    pub account_destination: String,
    pub bank_destination_id: String,
    pub bank_destination_name: String,
    pub amount: Decimal,
    pub description: String,
}
