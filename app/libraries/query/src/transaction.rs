use crate::{Contains, Page, SortType};
use app_schema::transaction::{Transaction, TransactionStatus};
use chrono::{DateTime, Days, NaiveDate, Utc};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionField {
    AccountSourceId,
    AccountDestination,
    BankDestinationId,
    Amount,
    CreatedAt,
}

impl TransactionField {
    pub const ALL: [TransactionField; 5] = [
        TransactionField::AccountSourceId,
        TransactionField::AccountDestination,
        TransactionField::BankDestinationId,
        TransactionField::Amount,
        TransactionField::CreatedAt,
    ];

    /// Fields accepted as substring filters.
    pub const TEXT: [TransactionField; 3] = [
        TransactionField::AccountSourceId,
        TransactionField::AccountDestination,
        TransactionField::BankDestinationId,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::AccountSourceId => "accountSourceId",
            Self::AccountDestination => "accountDestination",
            Self::BankDestinationId => "bankDestinationId",
            Self::Amount => "amount",
            Self::CreatedAt => "createdAt",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::AccountSourceId => "account_source_id",
            Self::AccountDestination => "account_destination",
            Self::BankDestinationId => "bank_destination_id",
            Self::Amount => "amount",
            Self::CreatedAt => "created_at",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    fn text<'a>(&self, tx: &'a Transaction) -> Option<&'a str> {
        match self {
            Self::AccountSourceId => Some(&tx.account_source_id),
            Self::AccountDestination => Some(&tx.account_destination),
            Self::BankDestinationId => Some(&tx.bank_destination_id),
            Self::Amount | Self::CreatedAt => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    pub page: Page,
    pub sort_by: TransactionField,
    pub sort_type: SortType,
    pub filters: Vec<Contains<TransactionField>>,
    pub status: Option<TransactionStatus>,
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub until: Option<DateTime<Utc>>,
    /// Restricts to transactions where this account is source or destination.
    pub account: Option<String>,
}

impl TransactionQuery {
    /// Newest first unless sorted otherwise.
    pub fn new(page: Page) -> Self {
        Self {
            page,
            sort_by: TransactionField::CreatedAt,
            sort_type: SortType::Desc,
            filters: Vec::new(),
            status: None,
            from: None,
            until: None,
            account: None,
        }
    }

    pub fn sort(mut self, sort_by: Option<&str>, sort_type: Option<&str>) -> Self {
        match sort_by.and_then(TransactionField::from_key) {
            Some(field) => {
                self.sort_by = field;
                self.sort_type = SortType::parse_or(sort_type, SortType::Asc);
            }
            None => {
                self.sort_by = TransactionField::CreatedAt;
                self.sort_type = SortType::parse_or(sort_type, SortType::Desc);
            }
        }
        self
    }

    /// Substring condition on a text field; other fields and blank values are ignored.
    pub fn filter(mut self, field: TransactionField, value: Option<&str>) -> Self {
        if !TransactionField::TEXT.contains(&field) {
            return self;
        }
        if let Some(needle) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.filters.push(Contains {
                field,
                needle: needle.to_owned(),
            });
        }
        self
    }

    pub fn status(mut self, status: Option<TransactionStatus>) -> Self {
        self.status = status;
        self
    }

    /// Whole-day range, both ends inclusive. A single `on` day overrides it.
    pub fn dates(
        mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        on: Option<NaiveDate>,
    ) -> Self {
        let (from, to) = match on {
            Some(day) => (Some(day), Some(day)),
            None => (from, to),
        };
        self.from = from.and_then(start_of_day);
        self.until = to
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .and_then(start_of_day);
        self
    }

    pub fn account(mut self, account_number: impl Into<String>) -> Self {
        self.account = Some(account_number.into());
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(status) = self.status
            && tx.status != status
        {
            return false;
        }
        if let Some(from) = self.from
            && tx.created_at < from
        {
            return false;
        }
        if let Some(until) = self.until
            && tx.created_at >= until
        {
            return false;
        }
        if let Some(account) = &self.account
            && &tx.account_source_id != account
            && &tx.account_destination != account
        {
            return false;
        }
        self.filters
            .iter()
            .all(|f| f.field.text(tx).is_some_and(|v| f.matches(v)))
    }

    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let ord = match self.sort_by {
            TransactionField::Amount => a.amount.cmp(&b.amount),
            TransactionField::CreatedAt => a.created_at.cmp(&b.created_at),
            field => field.text(a).cmp(&field.text(b)),
        }
        .then(a.id.cmp(&b.id));
        match self.sort_type {
            SortType::Asc => ord,
            SortType::Desc => ord.reverse(),
        }
    }
}

fn start_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0).map(|t| t.and_utc())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn tx(id: i64, source: &str, dest: &str, amount: i64, day: u32) -> Transaction {
        Transaction {
            id,
            account_source_id: source.to_owned(),
            account_destination: dest.to_owned(),
            bank_destination_id: "A2HL".to_owned(),
            bank_destination_name: "A2HL Bank".to_owned(),
            amount: Decimal::new(amount, 0),
            description: String::new(),
            status: TransactionStatus::Success,
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn defaults_to_newest_first() {
        let q = TransactionQuery::new(Page::default()).sort(Some("bogus"), None);
        assert_eq!(q.sort_by, TransactionField::CreatedAt);
        assert_eq!(q.sort_type, SortType::Desc);
        assert_eq!(q.compare(&tx(1, "a", "b", 1, 1), &tx(2, "a", "b", 1, 2)), Ordering::Greater);
    }

    #[test]
    fn date_range_is_inclusive() {
        let q = TransactionQuery::new(Page::default()).dates(
            NaiveDate::from_ymd_opt(2024, 3, 2),
            NaiveDate::from_ymd_opt(2024, 3, 3),
            None,
        );
        assert!(!q.matches(&tx(1, "a", "b", 1, 1)));
        assert!(q.matches(&tx(2, "a", "b", 1, 2)));
        assert!(q.matches(&tx(3, "a", "b", 1, 3)));
        assert!(!q.matches(&tx(4, "a", "b", 1, 4)));

        let single = TransactionQuery::new(Page::default()).dates(
            None,
            None,
            NaiveDate::from_ymd_opt(2024, 3, 4),
        );
        assert!(single.matches(&tx(4, "a", "b", 1, 4)));
        assert!(!single.matches(&tx(3, "a", "b", 1, 3)));
    }

    #[test]
    fn account_matches_either_side() {
        let q = TransactionQuery::new(Page::default()).account("100");
        assert!(q.matches(&tx(1, "100", "200", 1, 1)));
        assert!(q.matches(&tx(2, "300", "100", 1, 1)));
        assert!(!q.matches(&tx(3, "300", "200", 1, 1)));
    }

    #[test]
    fn non_text_fields_are_not_filters() {
        let q = TransactionQuery::new(Page::default())
            .filter(TransactionField::Amount, Some("10"))
            .filter(TransactionField::AccountSourceId, Some("10"));
        assert_eq!(q.filters.len(), 1);
        assert!(q.matches(&tx(1, "9100", "2", 1, 1)));
    }

    #[test]
    fn status_filter_is_exact() {
        let q = TransactionQuery::new(Page::default()).status(Some(TransactionStatus::Pending));
        assert!(!q.matches(&tx(1, "a", "b", 1, 1)));
    }
}
