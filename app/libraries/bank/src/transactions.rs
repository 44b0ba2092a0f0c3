use crate::{acting_customer, confirm_password, ensure_active, list_output, validate_amount};
use app_dto::{
    envelope::{DataOutput, ListOutput},
    transaction::{
        GetHistoryQuery, GetTransactionsQuery, PostTransferConfirmInput, PostTransferRequestInput,
    },
};
use app_error::AppError;
use app_query::{Page, TransactionField, TransactionQuery};
use app_schema::{
    auth::user::AuthUser,
    transaction::{NewTransaction, Transaction, TransactionStatus},
};
use app_store::BankStore;
use chrono::NaiveDate;
use tracing::*;

pub const EMPTY_LISTING: &str = "Transaction not found!";
pub const TRANSACTION_NOT_FOUND: &str = "Transaction not found";
pub const INVALID_STATUS: &str = "Invalid transaction status!";
pub const INVALID_DATE: &str = "Invalid date! Expected YYYY-MM-DD";
pub const DESTINATION_NOT_FOUND: &str = "Destination account not found!";
pub const SELF_TRANSFER: &str = "You cannot transfer to your own account!";
pub const ALREADY_PROCESSED: &str = "Transaction has already been processed";

/// This bank, as recorded on internal transfers.
#[derive(Debug, Clone, Copy)]
pub struct BankRef<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

fn parse_day(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::bad_request(INVALID_DATE)),
    }
}

pub fn transaction_query(
    params: &GetTransactionsQuery,
    max_page_size: u32,
) -> Result<TransactionQuery, AppError> {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => Some(
            TransactionStatus::from_name(name)
                .ok_or_else(|| AppError::bad_request(INVALID_STATUS))?,
        ),
    };
    let page = Page::parse(
        params.page.as_deref(),
        params.limit.as_deref(),
        max_page_size,
    );
    Ok(TransactionQuery::new(page)
        .sort(params.sort_by.as_deref(), params.sort_type.as_deref())
        .filter(
            TransactionField::AccountSourceId,
            params.account_source_id.as_deref(),
        )
        .filter(
            TransactionField::AccountDestination,
            params.account_destination.as_deref(),
        )
        .filter(
            TransactionField::BankDestinationId,
            params.bank_destination_id.as_deref(),
        )
        .status(status)
        .dates(
            parse_day(params.from_date.as_deref())?,
            parse_day(params.to_date.as_deref())?,
            parse_day(params.create_date.as_deref())?,
        ))
}

/// Staff listing over every transaction.
pub async fn list_transactions(
    store: &dyn BankStore,
    params: &GetTransactionsQuery,
    max_page_size: u32,
) -> Result<ListOutput<Transaction>, AppError> {
    let query = transaction_query(params, max_page_size)?;
    debug!("{:?}", &query);
    let paged = store.list_transactions(&query).await?;
    Ok(list_output(query.page, paged, EMPTY_LISTING))
}

/// The actor's own transfers, sent or received, newest first.
pub async fn transaction_history(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
    params: &GetHistoryQuery,
    max_page_size: u32,
) -> Result<ListOutput<Transaction>, AppError> {
    let customer = acting_customer(store, actor).await?;
    let page = Page::parse(
        params.page.as_deref(),
        params.limit.as_deref(),
        max_page_size,
    );
    let query = TransactionQuery::new(page).account(customer.account_number);
    let paged = store.list_transactions(&query).await?;
    Ok(list_output(query.page, paged, EMPTY_LISTING))
}

/// First step of an internal transfer: validates and records it as pending.
/// No money moves until [`confirm_internal_transfer`].
pub async fn request_internal_transfer(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
    input: PostTransferRequestInput,
    bank: BankRef<'_>,
) -> Result<DataOutput<Transaction>, AppError> {
    let customer = acting_customer(store, actor).await?;
    ensure_active(&customer)?;
    validate_amount(input.amount)?;
    let destination = input.account_destination.trim();
    if destination == customer.account_number {
        return Err(AppError::bad_request(SELF_TRANSFER));
    }
    store
        .find_customer_by_account(destination)
        .await?
        .ok_or_else(|| AppError::not_found(DESTINATION_NOT_FOUND))?;
    if customer.balance < input.amount {
        return Err(AppError::insufficient_funds());
    }

    let tx = store
        .create_transaction(NewTransaction {
            account_source_id: customer.account_number,
            account_destination: destination.to_owned(),
            bank_destination_id: bank.id.to_owned(),
            bank_destination_name: bank.name.to_owned(),
            amount: input.amount,
            description: input.description.trim().to_owned(),
        })
        .await?;
    info!("Transfer {} requested by customer {}", tx.id, customer.id);
    Ok(DataOutput::new(tx))
}

/// Second step: re-checks the password and account status, then settles the
/// pending transfer.
pub async fn confirm_internal_transfer(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
    input: PostTransferConfirmInput,
) -> Result<DataOutput<Transaction>, AppError> {
    let customer = acting_customer(store, actor).await?;
    confirm_password(&customer, &input.password)?;
    ensure_active(&customer)?;

    let tx = store
        .find_transaction(input.transaction_id)
        .await?
        .filter(|t| t.account_source_id == customer.account_number)
        .ok_or_else(|| AppError::not_found(TRANSACTION_NOT_FOUND))?;
    if tx.status != TransactionStatus::Pending {
        return Err(AppError::conflict(ALREADY_PROCESSED));
    }

    let settled = store.settle_transfer(tx.id).await?;
    if settled.status == TransactionStatus::Failed {
        warn!("Transfer {} failed on settlement", settled.id);
        return Err(AppError::insufficient_funds());
    }
    info!("Transfer {} settled", settled.id);
    Ok(DataOutput::new(settled))
}
