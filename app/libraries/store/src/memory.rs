use crate::{BankStore, INACTIVE_ACCOUNT};
use app_error::AppError;
use app_query::{CustomerQuery, Paged, TransactionQuery};
use app_schema::{
    auth::staff::{NewStaff, Staff},
    customer::{Customer, CustomerStatus, NewCustomer, ProfileChanges},
    deposit::{Deposit, DepositStatus},
    identity::{Identity, NewIdentity},
    transaction::{NewTransaction, Transaction, TransactionStatus},
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    customers: Vec<Customer>,
    identities: Vec<Identity>,
    staff: Vec<Staff>,
    transactions: Vec<Transaction>,
    deposits: Vec<Deposit>,
}

impl Tables {
    fn live_customer(&self, pred: impl Fn(&Customer) -> bool) -> Option<&Customer> {
        self.customers
            .iter()
            .find(|c| c.status != CustomerStatus::Deleted && pred(c))
    }

    fn live_customer_mut(&mut self, pred: impl Fn(&Customer) -> bool) -> Option<&mut Customer> {
        self.customers
            .iter_mut()
            .find(|c| c.status != CustomerStatus::Deleted && pred(c))
    }
}

/// In-process [`BankStore`] with the same visibility rules as PostgreSQL.
/// Counts calls so tests can assert that nothing was read or written.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    calls: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    fn read(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    fn write(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Trait calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Mutating trait calls made so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Inserts a row as-is, bypassing the counters.
    pub async fn seed_customer(&self, customer: Customer) -> Customer {
        self.tables.lock().await.customers.push(customer.clone());
        customer
    }

    pub async fn seed_identity(&self, identity: Identity) -> Identity {
        self.tables.lock().await.identities.push(identity.clone());
        identity
    }

    pub async fn seed_staff(&self, staff: Staff) -> Staff {
        self.tables.lock().await.staff.push(staff.clone());
        staff
    }

    pub async fn seed_transaction(&self, tx: Transaction) -> Transaction {
        self.tables.lock().await.transactions.push(tx.clone());
        tx
    }

    /// Raw row lookup, soft-deleted rows included.
    pub async fn customer_row(&self, id: i64) -> Option<Customer> {
        self.tables
            .lock()
            .await
            .customers
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub async fn identity_row(&self, id: i64) -> Option<Identity> {
        self.tables
            .lock()
            .await
            .identities
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

#[async_trait]
impl BankStore for MemoryStore {
    async fn find_customer(&self, id: i64) -> Result<Option<Customer>, AppError> {
        self.read();
        Ok(self.tables.lock().await.live_customer(|c| c.id == id).cloned())
    }

    async fn find_customer_by_login(&self, login: &str) -> Result<Option<Customer>, AppError> {
        self.read();
        let email = login.to_lowercase();
        Ok(self
            .tables
            .lock()
            .await
            .live_customer(|c| c.email.to_lowercase() == email || c.username == login)
            .cloned())
    }

    async fn find_customer_by_account(
        &self,
        account_number: &str,
    ) -> Result<Option<Customer>, AppError> {
        self.read();
        Ok(self
            .tables
            .lock()
            .await
            .live_customer(|c| c.account_number == account_number)
            .cloned())
    }

    async fn update_customer_status(
        &self,
        id: i64,
        status: CustomerStatus,
    ) -> Result<Option<Customer>, AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        Ok(tables.live_customer_mut(|c| c.id == id).map(|c| {
            c.status = status;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn list_customers(&self, query: &CustomerQuery) -> Result<Paged<Customer>, AppError> {
        self.read();
        let tables = self.tables.lock().await;
        let mut rows: Vec<Customer> = tables
            .customers
            .iter()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| query.compare(a, b).then(a.id.cmp(&b.id)));
        let total_items = rows.len() as u64;
        Ok(Paged {
            items: query.page.slice(rows),
            total_items,
        })
    }

    async fn create_customer(
        &self,
        customer: NewCustomer,
        identity: NewIdentity,
    ) -> Result<(Customer, Identity), AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        if tables
            .customers
            .iter()
            .any(|c| c.username == customer.username || c.email == customer.email)
        {
            return Err(AppError::conflict("Username or email is already registered!"));
        }
        let now = Utc::now();
        let row = Customer {
            id: next_id(tables.customers.iter().map(|c| c.id)),
            username: customer.username,
            email: customer.email,
            name: customer.name,
            date_of_birth: customer.date_of_birth,
            phone_number: customer.phone_number,
            address: customer.address,
            password_hash: customer.password_hash,
            account_number: customer.account_number,
            balance: Decimal::ZERO,
            status: CustomerStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let identity = Identity {
            id: next_id(tables.identities.iter().map(|i| i.id)),
            customer_id: row.id,
            identity_number: identity.identity_number,
            registration_date: identity.registration_date,
            front_image: identity.front_image,
            back_image: identity.back_image,
            staff_id_approved: None,
            approved_at: None,
            created_at: now,
        };
        tables.customers.push(row.clone());
        tables.identities.push(identity.clone());
        Ok((row, identity))
    }

    async fn update_customer_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<Customer>, AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        Ok(tables.live_customer_mut(|c| c.id == id).map(|c| {
            if let Some(name) = changes.name {
                c.name = name;
            }
            if let Some(phone_number) = changes.phone_number {
                c.phone_number = phone_number;
            }
            if let Some(address) = changes.address {
                c.address = address;
            }
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn update_customer_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        Ok(tables
            .live_customer_mut(|c| c.id == id)
            .map(|c| c.password_hash = password_hash.to_owned())
            .is_some())
    }

    async fn find_identity_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<Option<Identity>, AppError> {
        self.read();
        let tables = self.tables.lock().await;
        if tables.live_customer(|c| c.id == customer_id).is_none() {
            return Ok(None);
        }
        Ok(tables
            .identities
            .iter()
            .find(|i| i.customer_id == customer_id)
            .cloned())
    }

    async fn approve_identity(
        &self,
        identity_id: i64,
        staff_id: Uuid,
    ) -> Result<Option<Identity>, AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        let Some(identity) = tables
            .identities
            .iter_mut()
            .find(|i| i.id == identity_id && i.staff_id_approved.is_none())
        else {
            return Ok(None);
        };
        identity.staff_id_approved = Some(staff_id);
        identity.approved_at = Some(Utc::now());
        let identity = identity.clone();
        if let Some(customer) = tables.live_customer_mut(|c| c.id == identity.customer_id)
            && customer.status == CustomerStatus::Pending
        {
            customer.status = CustomerStatus::Active;
        }
        Ok(Some(identity))
    }

    async fn find_staff_by_email(&self, email: &str) -> Result<Option<Staff>, AppError> {
        self.read();
        Ok(self
            .tables
            .lock()
            .await
            .staff
            .iter()
            .find(|s| s.email.to_lowercase() == email.to_lowercase())
            .cloned())
    }

    async fn create_staff(&self, staff: NewStaff) -> Result<Staff, AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        if tables
            .staff
            .iter()
            .any(|s| s.email == staff.email || s.username == staff.username)
        {
            return Err(AppError::conflict("Staff already exists"));
        }
        let row = Staff {
            id: Uuid::new_v4(),
            username: staff.username,
            email: staff.email,
            name: staff.name,
            password_hash: staff.password_hash,
            created_at: Utc::now(),
        };
        tables.staff.push(row.clone());
        Ok(row)
    }

    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Paged<Transaction>, AppError> {
        self.read();
        let tables = self.tables.lock().await;
        let mut rows: Vec<Transaction> = tables
            .transactions
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        rows.sort_by(|a, b| query.compare(a, b));
        let total_items = rows.len() as u64;
        Ok(Paged {
            items: query.page.slice(rows),
            total_items,
        })
    }

    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction, AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        let row = Transaction {
            id: next_id(tables.transactions.iter().map(|t| t.id)),
            account_source_id: tx.account_source_id,
            account_destination: tx.account_destination,
            bank_destination_id: tx.bank_destination_id,
            bank_destination_name: tx.bank_destination_name,
            amount: tx.amount,
            description: tx.description,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        };
        tables.transactions.push(row.clone());
        Ok(row)
    }

    async fn find_transaction(&self, id: i64) -> Result<Option<Transaction>, AppError> {
        self.read();
        Ok(self
            .tables
            .lock()
            .await
            .transactions
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn settle_transfer(&self, transaction_id: i64) -> Result<Transaction, AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        let pending = tables
            .transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Transaction not found"))?;
        if pending.status != TransactionStatus::Pending {
            return Err(AppError::conflict("Transaction has already been processed"));
        }
        let source = tables.live_customer(|c| c.account_number == pending.account_source_id);
        if source.is_some_and(|c| c.status != CustomerStatus::Active) {
            return Err(AppError::forbidden(INACTIVE_ACCOUNT));
        }
        let source = source.map(|c| c.balance);
        let destination_exists = tables
            .live_customer(|c| c.account_number == pending.account_destination)
            .is_some();
        let status = match source {
            Some(balance) if destination_exists && balance >= pending.amount => {
                if let Some(c) =
                    tables.live_customer_mut(|c| c.account_number == pending.account_source_id)
                {
                    c.balance -= pending.amount;
                }
                if let Some(c) =
                    tables.live_customer_mut(|c| c.account_number == pending.account_destination)
                {
                    c.balance += pending.amount;
                }
                TransactionStatus::Success
            }
            _ => TransactionStatus::Failed,
        };
        let row = tables
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| AppError::not_found("Transaction not found"))?;
        row.status = status;
        Ok(row.clone())
    }

    async fn create_deposit(
        &self,
        customer_id: i64,
        amount: Decimal,
        term_months: i32,
    ) -> Result<Deposit, AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        let row = Deposit {
            id: next_id(tables.deposits.iter().map(|d| d.id)),
            customer_id,
            amount,
            term_months,
            status: DepositStatus::Pending,
            created_at: Utc::now(),
        };
        tables.deposits.push(row.clone());
        Ok(row)
    }

    async fn find_deposit(&self, id: i64) -> Result<Option<Deposit>, AppError> {
        self.read();
        Ok(self
            .tables
            .lock()
            .await
            .deposits
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn activate_deposit(&self, deposit_id: i64) -> Result<Deposit, AppError> {
        self.write();
        let mut tables = self.tables.lock().await;
        let deposit = tables
            .deposits
            .iter()
            .find(|d| d.id == deposit_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Deposit not found"))?;
        if deposit.status != DepositStatus::Pending {
            return Err(AppError::conflict("Deposit has already been processed"));
        }
        let customer = tables
            .live_customer_mut(|c| c.id == deposit.customer_id)
            .ok_or_else(|| AppError::not_found("Can't find this customer!"))?;
        if customer.status != CustomerStatus::Active {
            return Err(AppError::forbidden(INACTIVE_ACCOUNT));
        }
        if customer.balance < deposit.amount {
            return Err(AppError::insufficient_funds());
        }
        customer.balance -= deposit.amount;
        let row = tables
            .deposits
            .iter_mut()
            .find(|d| d.id == deposit_id)
            .ok_or_else(|| AppError::not_found("Deposit not found"))?;
        row.status = DepositStatus::Active;
        Ok(row.clone())
    }

    async fn list_deposits(
        &self,
        customer_id: i64,
        only_active: bool,
    ) -> Result<Vec<Deposit>, AppError> {
        self.read();
        let tables = self.tables.lock().await;
        let mut rows: Vec<Deposit> = tables
            .deposits
            .iter()
            .filter(|d| d.customer_id == customer_id)
            .filter(|d| !only_active || d.status == DepositStatus::Active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}
