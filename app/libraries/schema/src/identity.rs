use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub customer_id: i64,
    pub identity_number: String,
    pub registration_date: NaiveDate,
    pub front_image: String,
    pub back_image: String,
    pub staff_id_approved: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    #[inline]
    pub fn select_base() -> &'static str {
        include_str!("../../../SQL/identities/select_base.sql")
    }

    #[inline]
    pub fn insert_query() -> &'static str {
        include_str!("../../../SQL/identities/insert.sql")
    }

    #[inline]
    pub fn approve_query() -> &'static str {
        include_str!("../../../SQL/identities/approve.sql")
    }

    pub fn is_approved(&self) -> bool {
        self.staff_id_approved.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub identity_number: String,
    pub registration_date: NaiveDate,
    pub front_image: String,
    pub back_image: String,
}
