use crate::{Contains, Page, SortType};
use app_schema::customer::{Customer, CustomerStatus};
use std::cmp::Ordering;

/// Customer attributes that can be sorted on and filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    Username,
    Email,
    Name,
    PhoneNumber,
    Address,
}

impl CustomerField {
    pub const ALL: [CustomerField; 5] = [
        CustomerField::Username,
        CustomerField::Email,
        CustomerField::Name,
        CustomerField::PhoneNumber,
        CustomerField::Address,
    ];

    /// Query-string key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Name => "name",
            Self::PhoneNumber => "phoneNumber",
            Self::Address => "address",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Name => "name",
            Self::PhoneNumber => "phone_number",
            Self::Address => "address",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn value<'a>(&self, customer: &'a Customer) -> &'a str {
        match self {
            Self::Username => &customer.username,
            Self::Email => &customer.email,
            Self::Name => &customer.name,
            Self::PhoneNumber => &customer.phone_number,
            Self::Address => &customer.address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerQuery {
    pub page: Page,
    pub sort_by: CustomerField,
    pub sort_type: SortType,
    pub filters: Vec<Contains<CustomerField>>,
}

impl CustomerQuery {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            sort_by: CustomerField::Username,
            sort_type: SortType::Asc,
            filters: Vec::new(),
        }
    }

    /// Unknown sort keys fall back to `username`, unknown directions to `asc`.
    pub fn sort(mut self, sort_by: Option<&str>, sort_type: Option<&str>) -> Self {
        self.sort_by = sort_by
            .and_then(CustomerField::from_key)
            .unwrap_or(CustomerField::Username);
        self.sort_type = SortType::parse_or(sort_type, SortType::Asc);
        self
    }

    /// Adds a substring condition; blank values are ignored.
    pub fn filter(mut self, field: CustomerField, value: Option<&str>) -> Self {
        if let Some(needle) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.filters.push(Contains {
                field,
                needle: needle.to_owned(),
            });
        }
        self
    }

    /// Soft-deleted customers never match.
    pub fn matches(&self, customer: &Customer) -> bool {
        customer.status != CustomerStatus::Deleted
            && self
                .filters
                .iter()
                .all(|f| f.matches(f.field.value(customer)))
    }

    pub fn compare(&self, a: &Customer, b: &Customer) -> Ordering {
        let ord = self.sort_by.value(a).cmp(self.sort_by.value(b));
        match self.sort_type {
            SortType::Asc => ord,
            SortType::Desc => ord.reverse(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn customer(username: &str, address: &str, status: CustomerStatus) -> Customer {
        Customer {
            id: 1,
            username: username.to_owned(),
            email: format!("{username}@bank"),
            name: username.to_uppercase(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            phone_number: "+84900".to_owned(),
            address: address.to_owned(),
            password_hash: String::new(),
            account_number: "1".to_owned(),
            balance: Decimal::ZERO,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_sort_keys_use_defaults() {
        let q = CustomerQuery::new(Page::default()).sort(Some("password_hash"), Some("up"));
        assert_eq!(q.sort_by, CustomerField::Username);
        assert_eq!(q.sort_type, SortType::Asc);

        let q = CustomerQuery::new(Page::default()).sort(Some("phoneNumber"), Some("desc"));
        assert_eq!(q.sort_by, CustomerField::PhoneNumber);
        assert_eq!(q.sort_by.column(), "phone_number");
        assert_eq!(q.sort_type, SortType::Desc);
    }

    #[test]
    fn filters_are_case_insensitive_and_conjunctive() {
        let q = CustomerQuery::new(Page::default())
            .filter(CustomerField::Address, Some("HANOI"))
            .filter(CustomerField::Username, Some("ali"))
            .filter(CustomerField::Email, Some("   "));
        assert_eq!(q.filters.len(), 2);
        assert!(q.matches(&customer("alice", "12 Hanoi St", CustomerStatus::Active)));
        assert!(!q.matches(&customer("bob", "12 Hanoi St", CustomerStatus::Active)));
        assert!(!q.matches(&customer("alice", "Saigon", CustomerStatus::Active)));
    }

    #[test]
    fn deleted_customers_never_match() {
        let q = CustomerQuery::new(Page::default());
        assert!(!q.matches(&customer("alice", "Hanoi", CustomerStatus::Deleted)));
        assert!(q.matches(&customer("alice", "Hanoi", CustomerStatus::Blocked)));
    }

    #[test]
    fn compare_respects_direction() {
        let a = customer("alice", "x", CustomerStatus::Active);
        let b = customer("bob", "x", CustomerStatus::Active);
        let asc = CustomerQuery::new(Page::default());
        assert_eq!(asc.compare(&a, &b), Ordering::Less);
        let desc = asc.sort(None, Some("desc"));
        assert_eq!(desc.compare(&a, &b), Ordering::Greater);
    }
}
