//! Back-office operations.
//!
//! Each operation takes the store and, where authorization matters, the
//! authenticated actor as explicit arguments. Handlers only extract and
//! forward.

pub mod auth;
pub mod customers;
pub mod deposits;
pub mod identities;
pub mod profile;
pub mod registration;
pub mod staff;
pub mod transactions;

#[cfg(test)]
pub(crate) mod fixtures;

use app_cryptography::hash::verify;
use app_dto::envelope::{ListOutput, SUCCESS};
use app_error::AppError;
use app_query::{Page, Paged};
use app_schema::{
    auth::user::AuthUser,
    customer::{Customer, CustomerStatus},
};
use app_store::BankStore;
use rust_decimal::Decimal;

pub use app_store::INACTIVE_ACCOUNT;
pub const NOT_LOGGED_IN: &str = "You are not logged in! Please log in to get access.";
pub const WRONG_CREDENTIALS: &str = "Provided information is wrong!";
pub const INVALID_AMOUNT: &str = "Amount must be greater than zero!";
pub const AMOUNT_PRECISION: &str = "Amount can have at most 2 decimal places!";

/// Money columns are `NUMERIC(20, 2)`.
const MONEY_SCALE: u32 = 2;

pub(crate) fn list_output<T, U>(
    page: Page,
    paged: Paged<T>,
    empty_message: &str,
) -> ListOutput<U>
where
    U: From<T>,
{
    let message = paged.items.is_empty().then(|| empty_message.to_owned());
    ListOutput {
        status: SUCCESS,
        page: page.page,
        limit: page.limit,
        total_items: paged.total_items,
        total_pages: page.total_pages(paged.total_items),
        items: paged.items.into_iter().map(U::from).collect(),
        message,
    }
}

/// Loads the customer behind `actor`. Staff and anonymous callers get 401,
/// a customer whose row has since been deleted gets 401 as well.
pub(crate) async fn acting_customer(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
) -> Result<Customer, AppError> {
    let id = actor
        .and_then(AuthUser::customer_id)
        .ok_or_else(|| AppError::unauthorized(NOT_LOGGED_IN))?;
    store
        .find_customer(id)
        .await?
        .ok_or_else(|| AppError::unauthorized(NOT_LOGGED_IN))
}

/// Re-checks the customer's password before a money movement.
pub(crate) fn confirm_password(customer: &Customer, password: &str) -> Result<(), AppError> {
    if customer.password_hash.is_empty() || !verify(password, &customer.password_hash)? {
        return Err(AppError::forbidden(WRONG_CREDENTIALS));
    }
    Ok(())
}

/// Only `active` customers may move money, at request and at confirmation.
pub(crate) fn ensure_active(customer: &Customer) -> Result<(), AppError> {
    if customer.status != CustomerStatus::Active {
        return Err(AppError::forbidden(INACTIVE_ACCOUNT));
    }
    Ok(())
}

/// Rejects amounts the money columns would round.
pub(crate) fn validate_amount(amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::bad_request(INVALID_AMOUNT));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AppError::bad_request(AMOUNT_PRECISION));
    }
    Ok(())
}
