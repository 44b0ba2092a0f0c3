use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "deposit_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Pending,
    Active,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub id: i64,
    pub customer_id: i64,
    pub amount: Decimal,
    pub term_months: i32,
    pub status: DepositStatus,
    pub created_at: DateTime<Utc>,
}

impl Deposit {
    /// Terms offered for savings deposits, in months.
    pub const TERMS: [i32; 4] = [1, 3, 6, 12];

    #[inline]
    pub fn select_base() -> &'static str {
        include_str!("../../../SQL/deposits/select_base.sql")
    }

    #[inline]
    pub fn insert_query() -> &'static str {
        include_str!("../../../SQL/deposits/insert.sql")
    }
}
