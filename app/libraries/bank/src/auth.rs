use crate::WRONG_CREDENTIALS;
use app_cryptography::{hash::verify, random::session_id};
use app_dto::auth::login::PostLoginInput;
use app_error::AppError;
use app_schema::{
    auth::{
        staff::Staff,
        user::{AuthUser, Role},
    },
    customer::Customer,
};
use app_store::BankStore;
use tracing::*;

fn wrong_credentials() -> AppError {
    AppError::forbidden(WRONG_CREDENTIALS)
}

pub fn customer_principal(customer: &Customer, session: u64) -> AuthUser {
    AuthUser {
        id: customer.id.to_string(),
        name: customer.name.clone(),
        email: customer.email.clone(),
        role: Role::Customer,
        session,
    }
}

pub fn staff_principal(staff: &Staff, session: u64) -> AuthUser {
    AuthUser {
        id: staff.id.to_string(),
        name: staff.name.clone(),
        email: staff.email.clone(),
        role: Role::Staff,
        session,
    }
}

/// Checks customer credentials and opens a new session for them.
///
/// `email` may carry the username instead. Unknown logins, bad passwords and
/// customers who may not log in all get the same 403.
pub async fn authenticate_customer(
    store: &dyn BankStore,
    input: &PostLoginInput,
) -> Result<AuthUser, AppError> {
    let customer = store
        .find_customer_by_login(input.email.trim())
        .await?
        .ok_or_else(wrong_credentials)?;
    if !verify(&input.password, &customer.password_hash)? {
        return Err(wrong_credentials());
    }
    if !customer.status.can_login() {
        warn!("Customer {} refused: {}", customer.id, customer.status.as_str());
        return Err(wrong_credentials());
    }
    info!("Customer {} logged in", customer.id);
    Ok(customer_principal(&customer, session_id()))
}

pub async fn authenticate_staff(
    store: &dyn BankStore,
    input: &PostLoginInput,
) -> Result<AuthUser, AppError> {
    let staff = store
        .find_staff_by_email(input.email.trim())
        .await?
        .ok_or_else(wrong_credentials)?;
    if !verify(&input.password, &staff.password_hash)? {
        return Err(wrong_credentials());
    }
    info!("Staff {} logged in", staff.email);
    Ok(staff_principal(&staff, session_id()))
}
