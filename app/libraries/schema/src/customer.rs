use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "customer_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Pending,
    Active,
    Blocked,
    /// Soft-delete sentinel; such customers are invisible to every read.
    Deleted,
}

impl CustomerStatus {
    pub const ALL: [CustomerStatus; 4] = [
        CustomerStatus::Pending,
        CustomerStatus::Active,
        CustomerStatus::Blocked,
        CustomerStatus::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Deleted => "deleted",
        }
    }

    /// Exact-name lookup in the fixed enumeration.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn can_login(&self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub address: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub account_number: String,
    pub balance: Decimal,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn select_base() -> &'static str {
        include_str!("../../../SQL/customers/select_base.sql")
    }

    #[inline]
    pub fn update_status_query() -> &'static str {
        include_str!("../../../SQL/customers/update_status.sql")
    }

    #[inline]
    pub fn insert_query() -> &'static str {
        include_str!("../../../SQL/customers/insert.sql")
    }
}

/// Values for a customer row created at registration.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub username: String,
    pub email: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub address: String,
    pub password_hash: String,
    pub account_number: String,
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_names_resolve_exactly() {
        assert_eq!(
            CustomerStatus::from_name("active"),
            Some(CustomerStatus::Active)
        );
        assert_eq!(
            CustomerStatus::from_name("deleted"),
            Some(CustomerStatus::Deleted)
        );
        assert_eq!(CustomerStatus::from_name("Active"), None);
        assert_eq!(CustomerStatus::from_name("frozen"), None);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let customer = Customer {
            id: 1,
            username: "alice".to_owned(),
            email: "alice@bank".to_owned(),
            name: "Alice".to_owned(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            phone_number: "+84123".to_owned(),
            address: "Hanoi".to_owned(),
            password_hash: "secret".to_owned(),
            account_number: "100000000001".to_owned(),
            balance: Decimal::ZERO,
            status: CustomerStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&customer).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["phoneNumber"], "+84123");
        assert_eq!(json["status"], "active");
    }
}
