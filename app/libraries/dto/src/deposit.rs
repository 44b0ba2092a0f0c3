use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDepositRequestInput {
    pub amount: Decimal,
    pub term_months: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDepositConfirmInput {
    pub deposit_id: i64,
    pub password: String,
}
