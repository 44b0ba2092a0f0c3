use crate::{BankStore, INACTIVE_ACCOUNT};
use app_error::AppError;
use app_query::{CustomerQuery, Paged, TransactionQuery, contains_pattern};
use app_schema::{
    auth::staff::{NewStaff, Staff},
    customer::{Customer, CustomerStatus, NewCustomer, ProfileChanges},
    deposit::{Deposit, DepositStatus},
    identity::{Identity, NewIdentity},
    transaction::{NewTransaction, Transaction, TransactionStatus},
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, postgres::PgConnection};
use tracing::*;
use uuid::Uuid;

const CUSTOMER_COLUMNS: &str = "id, username, email, name, date_of_birth, phone_number, address, \
     password_hash, account_number, balance, status, created_at, updated_at";
const TRANSACTION_COLUMNS: &str = "id, account_source_id, account_destination, \
     bank_destination_id, bank_destination_name, amount, description, status, created_at";
const DEPOSIT_COLUMNS: &str = "id, customer_id, amount, term_months, status, created_at";

#[derive(Clone)]
pub struct PgStore {
    pg: PgPool,
}

impl PgStore {
    pub fn new(pg: PgPool) -> Self {
        Self { pg }
    }
}

fn push_customer_where(qb: &mut QueryBuilder<'_, Postgres>, query: &CustomerQuery) {
    qb.push(" WHERE status <> ").push_bind(CustomerStatus::Deleted);
    for filter in &query.filters {
        qb.push(" AND ")
            .push(filter.field.column())
            .push(" ILIKE ")
            .push_bind(contains_pattern(&filter.needle))
            .push(" ESCAPE '\\'");
    }
}

fn push_transaction_where(qb: &mut QueryBuilder<'_, Postgres>, query: &TransactionQuery) {
    qb.push(" WHERE TRUE");
    for filter in &query.filters {
        qb.push(" AND ")
            .push(filter.field.column())
            .push(" ILIKE ")
            .push_bind(contains_pattern(&filter.needle))
            .push(" ESCAPE '\\'");
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(from) = query.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(until) = query.until {
        qb.push(" AND created_at < ").push_bind(until);
    }
    if let Some(account) = &query.account {
        qb.push(" AND (account_source_id = ")
            .push_bind(account.clone())
            .push(" OR account_destination = ")
            .push_bind(account.clone())
            .push(")");
    }
}

fn limit_offset(query_page: &app_query::Page) -> (i64, i64) {
    (
        i64::from(query_page.limit),
        i64::try_from(query_page.offset()).unwrap_or(i64::MAX),
    )
}

/// Locks the given accounts in a stable order and returns
/// `(account, balance, status)` rows.
async fn lock_accounts(
    conn: &mut PgConnection,
    accounts: &[&str],
) -> Result<Vec<(String, Decimal, CustomerStatus)>, AppError> {
    let accounts: Vec<String> = accounts.iter().map(|a| a.to_string()).collect();
    let rows = sqlx::query_as::<_, (String, Decimal, CustomerStatus)>(
        "SELECT account_number, balance, status FROM customers \
         WHERE account_number = ANY($1) AND status <> 'deleted' \
         ORDER BY account_number FOR UPDATE",
    )
    .bind(&accounts)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

async fn set_transaction_status(
    conn: &mut PgConnection,
    id: i64,
    status: TransactionStatus,
) -> Result<Transaction, AppError> {
    let tx = sqlx::query_as::<_, Transaction>(&format!(
        "UPDATE transactions SET status = $2 WHERE id = $1 RETURNING {TRANSACTION_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .fetch_one(conn)
    .await?;
    Ok(tx)
}

#[async_trait]
impl BankStore for PgStore {
    async fn find_customer(&self, id: i64) -> Result<Option<Customer>, AppError> {
        let res = sqlx::query_as::<_, Customer>(&format!(
            "{} WHERE id = $1 AND status <> 'deleted'",
            Customer::select_base()
        ))
        .bind(id)
        .fetch_optional(&self.pg)
        .await?;
        Ok(res)
    }

    async fn find_customer_by_login(&self, login: &str) -> Result<Option<Customer>, AppError> {
        let res = sqlx::query_as::<_, Customer>(&format!(
            "{} WHERE (LOWER(email) = LOWER($1) OR username = $1) AND status <> 'deleted'",
            Customer::select_base()
        ))
        .bind(login)
        .fetch_optional(&self.pg)
        .await?;
        Ok(res)
    }

    async fn find_customer_by_account(
        &self,
        account_number: &str,
    ) -> Result<Option<Customer>, AppError> {
        let res = sqlx::query_as::<_, Customer>(&format!(
            "{} WHERE account_number = $1 AND status <> 'deleted'",
            Customer::select_base()
        ))
        .bind(account_number)
        .fetch_optional(&self.pg)
        .await?;
        Ok(res)
    }

    async fn update_customer_status(
        &self,
        id: i64,
        status: CustomerStatus,
    ) -> Result<Option<Customer>, AppError> {
        let res = sqlx::query_as::<_, Customer>(Customer::update_status_query())
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pg)
            .await?;
        debug!("UPDATE customer {} status {:?}: {}", id, status, res.is_some());
        Ok(res)
    }

    async fn list_customers(&self, query: &CustomerQuery) -> Result<Paged<Customer>, AppError> {
        let (limit, offset) = limit_offset(&query.page);

        let mut qb = QueryBuilder::<Postgres>::new(Customer::select_base());
        push_customer_where(&mut qb, query);
        qb.push(format!(
            " ORDER BY {} {}, id ASC",
            query.sort_by.column(),
            query.sort_type.as_sql()
        ));
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
        let items = qb.build_query_as::<Customer>().fetch_all(&self.pg).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM customers");
        push_customer_where(&mut count, query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pg).await?;

        Ok(Paged {
            items,
            total_items: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn create_customer(
        &self,
        customer: NewCustomer,
        identity: NewIdentity,
    ) -> Result<(Customer, Identity), AppError> {
        let mut tx = self.pg.begin().await?;
        let customer = sqlx::query_as::<_, Customer>(Customer::insert_query())
            .bind(&customer.username)
            .bind(&customer.email)
            .bind(&customer.name)
            .bind(customer.date_of_birth)
            .bind(&customer.phone_number)
            .bind(&customer.address)
            .bind(&customer.password_hash)
            .bind(&customer.account_number)
            .fetch_one(&mut *tx)
            .await?;
        let identity = sqlx::query_as::<_, Identity>(Identity::insert_query())
            .bind(customer.id)
            .bind(&identity.identity_number)
            .bind(identity.registration_date)
            .bind(&identity.front_image)
            .bind(&identity.back_image)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("INSERT customer {} ({})", customer.id, &customer.username);
        Ok((customer, identity))
    }

    async fn update_customer_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<Customer>, AppError> {
        let res = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET name = COALESCE($2, name), \
             phone_number = COALESCE($3, phone_number), \
             address = COALESCE($4, address), updated_at = NOW() \
             WHERE id = $1 AND status <> 'deleted' RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.phone_number)
        .bind(changes.address)
        .fetch_optional(&self.pg)
        .await?;
        Ok(res)
    }

    async fn update_customer_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        let res = sqlx::query(
            "UPDATE customers SET password_hash = $2, updated_at = NOW() \
             WHERE id = $1 AND status <> 'deleted'",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pg)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn find_identity_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<Option<Identity>, AppError> {
        let res = sqlx::query_as::<_, Identity>(&format!(
            "{} AND i.customer_id = $1",
            Identity::select_base()
        ))
        .bind(customer_id)
        .fetch_optional(&self.pg)
        .await?;
        Ok(res)
    }

    async fn approve_identity(
        &self,
        identity_id: i64,
        staff_id: Uuid,
    ) -> Result<Option<Identity>, AppError> {
        let mut tx = self.pg.begin().await?;
        let identity = sqlx::query_as::<_, Identity>(Identity::approve_query())
            .bind(identity_id)
            .bind(staff_id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(identity) = &identity {
            sqlx::query(
                "UPDATE customers SET status = 'active', updated_at = NOW() \
                 WHERE id = $1 AND status = 'pending'",
            )
            .bind(identity.customer_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(identity)
    }

    async fn find_staff_by_email(&self, email: &str) -> Result<Option<Staff>, AppError> {
        let res = sqlx::query_as::<_, Staff>(&format!(
            "{} WHERE LOWER(email) = LOWER($1)",
            Staff::select_query()
        ))
        .bind(email)
        .fetch_optional(&self.pg)
        .await?;
        Ok(res)
    }

    async fn create_staff(&self, staff: NewStaff) -> Result<Staff, AppError> {
        let res = sqlx::query_as::<_, Staff>(Staff::insert_query())
            .bind(Uuid::new_v4())
            .bind(&staff.username)
            .bind(&staff.email)
            .bind(&staff.name)
            .bind(&staff.password_hash)
            .fetch_one(&self.pg)
            .await?;
        Ok(res)
    }

    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Paged<Transaction>, AppError> {
        let (limit, offset) = limit_offset(&query.page);

        let mut qb = QueryBuilder::<Postgres>::new(Transaction::select_base());
        push_transaction_where(&mut qb, query);
        qb.push(format!(
            " ORDER BY {} {}, id {}",
            query.sort_by.column(),
            query.sort_type.as_sql(),
            query.sort_type.as_sql()
        ));
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
        let items = qb.build_query_as::<Transaction>().fetch_all(&self.pg).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions");
        push_transaction_where(&mut count, query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pg).await?;

        Ok(Paged {
            items,
            total_items: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction, AppError> {
        let res = sqlx::query_as::<_, Transaction>(Transaction::insert_query())
            .bind(&tx.account_source_id)
            .bind(&tx.account_destination)
            .bind(&tx.bank_destination_id)
            .bind(&tx.bank_destination_name)
            .bind(tx.amount)
            .bind(&tx.description)
            .fetch_one(&self.pg)
            .await?;
        Ok(res)
    }

    async fn find_transaction(&self, id: i64) -> Result<Option<Transaction>, AppError> {
        let res = sqlx::query_as::<_, Transaction>(&format!(
            "{} WHERE id = $1",
            Transaction::select_base()
        ))
        .bind(id)
        .fetch_optional(&self.pg)
        .await?;
        Ok(res)
    }

    async fn settle_transfer(&self, transaction_id: i64) -> Result<Transaction, AppError> {
        let mut tx = self.pg.begin().await?;
        let pending = sqlx::query_as::<_, Transaction>(&format!(
            "{} WHERE id = $1 FOR UPDATE",
            Transaction::select_base()
        ))
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;
        if pending.status != TransactionStatus::Pending {
            return Err(AppError::conflict("Transaction has already been processed"));
        }

        let source = pending.account_source_id.as_str();
        let destination = pending.account_destination.as_str();
        let locked = lock_accounts(&mut *tx, &[source, destination]).await?;
        let balance_of = |account: &str| {
            locked
                .iter()
                .find(|(number, _, _)| number == account)
                .map(|(_, balance, _)| *balance)
        };
        let source_status = locked
            .iter()
            .find(|(number, _, _)| number == source)
            .map(|(_, _, status)| *status);
        if source_status.is_some_and(|s| s != CustomerStatus::Active) {
            return Err(AppError::forbidden(INACTIVE_ACCOUNT));
        }

        let settled = match (balance_of(source), balance_of(destination)) {
            (Some(balance), Some(_)) if balance >= pending.amount => {
                sqlx::query(
                    "UPDATE customers SET balance = balance - $2, updated_at = NOW() \
                     WHERE account_number = $1",
                )
                .bind(source)
                .bind(pending.amount)
                .execute(&mut *tx)
                .await?;
                sqlx::query(
                    "UPDATE customers SET balance = balance + $2, updated_at = NOW() \
                     WHERE account_number = $1",
                )
                .bind(destination)
                .bind(pending.amount)
                .execute(&mut *tx)
                .await?;
                set_transaction_status(&mut *tx, transaction_id, TransactionStatus::Success).await?
            }
            _ => set_transaction_status(&mut *tx, transaction_id, TransactionStatus::Failed).await?,
        };
        tx.commit().await?;
        info!(
            "Transfer {} from {} to {}: {:?}",
            settled.id, &settled.account_source_id, &settled.account_destination, settled.status
        );
        Ok(settled)
    }

    async fn create_deposit(
        &self,
        customer_id: i64,
        amount: Decimal,
        term_months: i32,
    ) -> Result<Deposit, AppError> {
        let res = sqlx::query_as::<_, Deposit>(Deposit::insert_query())
            .bind(customer_id)
            .bind(amount)
            .bind(term_months)
            .fetch_one(&self.pg)
            .await?;
        Ok(res)
    }

    async fn find_deposit(&self, id: i64) -> Result<Option<Deposit>, AppError> {
        let res = sqlx::query_as::<_, Deposit>(&format!("{} WHERE id = $1", Deposit::select_base()))
            .bind(id)
            .fetch_optional(&self.pg)
            .await?;
        Ok(res)
    }

    async fn activate_deposit(&self, deposit_id: i64) -> Result<Deposit, AppError> {
        let mut tx = self.pg.begin().await?;
        let deposit = sqlx::query_as::<_, Deposit>(&format!(
            "{} WHERE id = $1 FOR UPDATE",
            Deposit::select_base()
        ))
        .bind(deposit_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Deposit not found"))?;
        if deposit.status != DepositStatus::Pending {
            return Err(AppError::conflict("Deposit has already been processed"));
        }
        let (balance, status) = sqlx::query_as::<_, (Decimal, CustomerStatus)>(
            "SELECT balance, status FROM customers \
             WHERE id = $1 AND status <> 'deleted' FOR UPDATE",
        )
        .bind(deposit.customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Can't find this customer!"))?;
        if status != CustomerStatus::Active {
            return Err(AppError::forbidden(INACTIVE_ACCOUNT));
        }
        if balance < deposit.amount {
            return Err(AppError::insufficient_funds());
        }
        sqlx::query("UPDATE customers SET balance = balance - $2, updated_at = NOW() WHERE id = $1")
            .bind(deposit.customer_id)
            .bind(deposit.amount)
            .execute(&mut *tx)
            .await?;
        let activated = sqlx::query_as::<_, Deposit>(&format!(
            "UPDATE deposits SET status = $2 WHERE id = $1 RETURNING {DEPOSIT_COLUMNS}"
        ))
        .bind(deposit_id)
        .bind(DepositStatus::Active)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(activated)
    }

    async fn list_deposits(
        &self,
        customer_id: i64,
        only_active: bool,
    ) -> Result<Vec<Deposit>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(Deposit::select_base());
        qb.push(" WHERE customer_id = ").push_bind(customer_id);
        if only_active {
            qb.push(" AND status = ").push_bind(DepositStatus::Active);
        }
        qb.push(" ORDER BY created_at DESC, id DESC");
        let res = qb.build_query_as::<Deposit>().fetch_all(&self.pg).await?;
        Ok(res)
    }
}
