//! Persistence boundary for the back office.
//!
//! [`BankStore`] is what operations talk to. [`pg::PgStore`] backs it with
//! PostgreSQL; `memory::MemoryStore` (feature `testing`) keeps rows in process
//! for tests. Every read excludes soft-deleted customers.

use app_error::AppError;
use app_query::{CustomerQuery, Paged, TransactionQuery};
use app_schema::{
    auth::staff::{NewStaff, Staff},
    customer::{Customer, CustomerStatus, NewCustomer, ProfileChanges},
    deposit::Deposit,
    identity::{Identity, NewIdentity},
    transaction::{NewTransaction, Transaction},
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod pg;

pub use pg::PgStore;

/// Refusal for money movement out of an account that is not `active`.
pub const INACTIVE_ACCOUNT: &str = "Your account is not active!";

#[async_trait]
pub trait BankStore: Send + Sync {
    // Customers
    async fn find_customer(&self, id: i64) -> Result<Option<Customer>, AppError>;
    /// Matches on email (case-insensitive) or username (exact).
    async fn find_customer_by_login(&self, login: &str) -> Result<Option<Customer>, AppError>;
    async fn find_customer_by_account(
        &self,
        account_number: &str,
    ) -> Result<Option<Customer>, AppError>;
    /// Single-statement update; `None` when the customer is missing or deleted.
    async fn update_customer_status(
        &self,
        id: i64,
        status: CustomerStatus,
    ) -> Result<Option<Customer>, AppError>;
    async fn list_customers(&self, query: &CustomerQuery) -> Result<Paged<Customer>, AppError>;
    /// Creates the customer and its identity record together.
    async fn create_customer(
        &self,
        customer: NewCustomer,
        identity: NewIdentity,
    ) -> Result<(Customer, Identity), AppError>;
    async fn update_customer_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<Customer>, AppError>;
    async fn update_customer_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, AppError>;

    // Identities
    async fn find_identity_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<Option<Identity>, AppError>;
    /// Records the approver and activates a pending customer. `None` when the
    /// identity was approved concurrently.
    async fn approve_identity(
        &self,
        identity_id: i64,
        staff_id: Uuid,
    ) -> Result<Option<Identity>, AppError>;

    // Staff
    /// Email comparison ignores case.
    async fn find_staff_by_email(&self, email: &str) -> Result<Option<Staff>, AppError>;
    async fn create_staff(&self, staff: NewStaff) -> Result<Staff, AppError>;

    // Transactions
    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Paged<Transaction>, AppError>;
    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction, AppError>;
    async fn find_transaction(&self, id: i64) -> Result<Option<Transaction>, AppError>;
    /// Atomically moves the funds of a pending internal transfer. When the
    /// source cannot cover the amount or either account is gone the
    /// transaction is marked failed instead, and returned as such. A source
    /// that is no longer `active` gets a 403 and nothing changes.
    async fn settle_transfer(&self, transaction_id: i64) -> Result<Transaction, AppError>;

    // Deposits
    async fn create_deposit(
        &self,
        customer_id: i64,
        amount: Decimal,
        term_months: i32,
    ) -> Result<Deposit, AppError>;
    async fn find_deposit(&self, id: i64) -> Result<Option<Deposit>, AppError>;
    /// Atomically debits the payment account and activates a pending deposit.
    /// The owner must still be `active`.
    async fn activate_deposit(&self, deposit_id: i64) -> Result<Deposit, AppError>;
    async fn list_deposits(
        &self,
        customer_id: i64,
        only_active: bool,
    ) -> Result<Vec<Deposit>, AppError>;
}
