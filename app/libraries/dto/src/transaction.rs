use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub account_source_id: Option<String>,
    pub account_destination: Option<String>,
    pub bank_destination_id: Option<String>,
    pub status: Option<String>,
    /// `YYYY-MM-DD`
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub create_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHistoryQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTransferRequestInput {
    pub account_destination: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTransferConfirmInput {
    pub transaction_id: i64,
    pub password: String,
}
