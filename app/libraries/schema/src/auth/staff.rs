use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Staff {
    #[inline]
    pub fn select_query() -> &'static str {
        include_str!("../../../../SQL/staff/select_base.sql")
    }

    #[inline]
    pub fn insert_query() -> &'static str {
        include_str!("../../../../SQL/staff/insert.sql")
    }
}

#[derive(Debug, Clone)]
pub struct NewStaff {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}
