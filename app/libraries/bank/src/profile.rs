use crate::{WRONG_CREDENTIALS, acting_customer, customers::CUSTOMER_NOT_FOUND};
use app_cryptography::hash::{hash, verify};
use app_dto::{
    customer::{AccountOutput, CustomerSummary, PutProfileInput, PutUpdatePasswordInput},
    envelope::{DataOutput, MessageOutput},
};
use app_error::AppError;
use app_schema::{auth::user::AuthUser, customer::ProfileChanges};
use app_store::BankStore;
use tracing::*;

pub const PASSWORD_UPDATED: &str = "Password has been updated, please log in again";
pub const EMPTY_PASSWORD: &str = "New password must not be empty!";

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub async fn me(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
) -> Result<DataOutput<CustomerSummary>, AppError> {
    let customer = acting_customer(store, actor).await?;
    Ok(DataOutput::new(customer.into()))
}

/// Updates the contact fields that were sent; blank values are ignored.
pub async fn update_me(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
    input: PutProfileInput,
) -> Result<DataOutput<CustomerSummary>, AppError> {
    let customer = acting_customer(store, actor).await?;
    let changes = ProfileChanges {
        name: non_blank(input.name),
        phone_number: non_blank(input.phone_number),
        address: non_blank(input.address),
    };
    let customer = store
        .update_customer_profile(customer.id, changes)
        .await?
        .ok_or_else(|| AppError::not_found(CUSTOMER_NOT_FOUND))?;
    info!("Customer {} updated profile", customer.id);
    Ok(DataOutput::new(customer.into()))
}

/// Replaces the password after checking the current one. The caller is
/// expected to drop the session afterwards.
pub async fn update_password(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
    input: PutUpdatePasswordInput,
) -> Result<MessageOutput, AppError> {
    let customer = acting_customer(store, actor).await?;
    if !verify(&input.password, &customer.password_hash)? {
        return Err(AppError::forbidden(WRONG_CREDENTIALS));
    }
    if input.new_password.is_empty() {
        return Err(AppError::bad_request(EMPTY_PASSWORD));
    }
    let password_hash = hash(&input.new_password)?;
    if !store
        .update_customer_password(customer.id, &password_hash)
        .await?
    {
        return Err(AppError::not_found(CUSTOMER_NOT_FOUND));
    }
    info!("Customer {} changed password", customer.id);
    Ok(MessageOutput::new(PASSWORD_UPDATED))
}

pub async fn account(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
) -> Result<DataOutput<AccountOutput>, AppError> {
    let customer = acting_customer(store, actor).await?;
    Ok(DataOutput::new(AccountOutput {
        account_number: customer.account_number,
        balance: customer.balance,
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::{PASSWORD, customer_actor, funded_customer, staff, staff_actor};
    use app_store::memory::MemoryStore;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn me_requires_a_customer_actor() {
        let store = MemoryStore::default();
        let alice = store.seed_customer(funded_customer(1, "alice", 0)).await;

        let out = me(&store, Some(&customer_actor(&alice))).await.unwrap();
        assert_eq!(out.data.username, "alice");

        for actor in [None, Some(staff_actor(&staff()))] {
            let err = me(&store, actor.as_ref()).await.unwrap_err();
            assert_eq!(err.status.as_u16(), 401);
        }
    }

    #[tokio::test]
    async fn profile_update_skips_blank_fields() {
        let store = MemoryStore::default();
        let alice = store.seed_customer(funded_customer(1, "alice", 0)).await;
        let input = PutProfileInput {
            name: Some("Alice Tran".to_owned()),
            phone_number: Some("   ".to_owned()),
            address: None,
        };
        let out = update_me(&store, Some(&customer_actor(&alice)), input)
            .await
            .unwrap();
        assert_eq!(out.data.name, "Alice Tran");
        assert_eq!(out.data.phone_number, alice.phone_number);
        assert_eq!(out.data.address, alice.address);
    }

    #[tokio::test]
    async fn password_change_verifies_current_password() {
        let store = MemoryStore::default();
        let alice = store.seed_customer(funded_customer(1, "alice", 0)).await;
        let actor = customer_actor(&alice);

        let err = update_password(
            &store,
            Some(&actor),
            PutUpdatePasswordInput {
                password: "wrong".to_owned(),
                new_password: "fresh".to_owned(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status.as_u16(), 403);

        update_password(
            &store,
            Some(&actor),
            PutUpdatePasswordInput {
                password: PASSWORD.to_owned(),
                new_password: "fresh".to_owned(),
            },
        )
        .await
        .unwrap();
        let row = store.customer_row(1).await.unwrap();
        assert!(verify("fresh", &row.password_hash).unwrap());
    }

    #[tokio::test]
    async fn account_reports_balance() {
        let store = MemoryStore::default();
        let alice = store.seed_customer(funded_customer(1, "alice", 42)).await;
        let out = account(&store, Some(&customer_actor(&alice))).await.unwrap();
        assert_eq!(out.data.account_number, alice.account_number);
        assert_eq!(out.data.balance, Decimal::new(42, 0));
    }
}
