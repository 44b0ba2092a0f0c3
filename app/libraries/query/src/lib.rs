//! Typed listing specifications.
//!
//! Listing endpoints never turn request keys into column names directly.
//! Every sortable or filterable attribute is a variant of a field enum, and
//! the only way to reach a column is through that enum.

pub mod customer;
pub mod page;
pub mod transaction;

pub use customer::{CustomerField, CustomerQuery};
pub use page::{Page, Paged, SortType, contains_pattern};
pub use transaction::{TransactionField, TransactionQuery};

/// A case-insensitive substring condition on an allow-listed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contains<F> {
    pub field: F,
    pub needle: String,
}

impl<F> Contains<F> {
    pub fn matches(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle.to_lowercase())
    }
}
