use app_schema::{
    customer::{Customer, CustomerStatus},
    identity::Identity,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutCustomerStatusInput {
    pub id_customer: i64,
    pub status: String,
}

/// Raw listing query; values are parsed leniently into a typed query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCustomersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostApproveCustomerInput {
    pub customer_id: i64,
}

/// Customer as shown to staff and to the customer themself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub address: String,
    pub account_number: String,
    pub status: CustomerStatus,
}

impl From<Customer> for CustomerSummary {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            username: c.username,
            email: c.email,
            name: c.name,
            date_of_birth: c.date_of_birth,
            phone_number: c.phone_number,
            address: c.address,
            account_number: c.account_number,
            status: c.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetailOutput {
    pub customer: CustomerSummary,
    pub identity: Option<Identity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutProfileInput {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutUpdatePasswordInput {
    pub password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOutput {
    pub account_number: String,
    pub balance: Decimal,
}
