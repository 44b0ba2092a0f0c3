use crate::{acting_customer, confirm_password, ensure_active, validate_amount};
use app_dto::{
    deposit::{PostDepositConfirmInput, PostDepositRequestInput},
    envelope::DataOutput,
};
use app_error::AppError;
use app_schema::{
    auth::user::AuthUser,
    deposit::{Deposit, DepositStatus},
};
use app_store::BankStore;
use tracing::*;

pub const INVALID_TERM: &str = "Deposit term must be 1, 3, 6 or 12 months!";
pub const DEPOSIT_NOT_FOUND: &str = "Deposit not found";
pub const ALREADY_PROCESSED: &str = "Deposit has already been processed";

pub async fn request_deposit(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
    input: PostDepositRequestInput,
) -> Result<DataOutput<Deposit>, AppError> {
    let customer = acting_customer(store, actor).await?;
    ensure_active(&customer)?;
    validate_amount(input.amount)?;
    if !Deposit::TERMS.contains(&input.term_months) {
        return Err(AppError::bad_request(INVALID_TERM));
    }
    if customer.balance < input.amount {
        return Err(AppError::insufficient_funds());
    }
    let deposit = store
        .create_deposit(customer.id, input.amount, input.term_months)
        .await?;
    info!("Deposit {} requested by customer {}", deposit.id, customer.id);
    Ok(DataOutput::new(deposit))
}

/// Moves the deposit amount out of the payment account and activates it.
pub async fn confirm_deposit(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
    input: PostDepositConfirmInput,
) -> Result<DataOutput<Deposit>, AppError> {
    let customer = acting_customer(store, actor).await?;
    confirm_password(&customer, &input.password)?;
    ensure_active(&customer)?;
    let deposit = store
        .find_deposit(input.deposit_id)
        .await?
        .filter(|d| d.customer_id == customer.id)
        .ok_or_else(|| AppError::not_found(DEPOSIT_NOT_FOUND))?;
    if deposit.status != DepositStatus::Pending {
        return Err(AppError::conflict(ALREADY_PROCESSED));
    }
    let deposit = store.activate_deposit(deposit.id).await?;
    info!("Deposit {} activated", deposit.id);
    Ok(DataOutput::new(deposit))
}

pub async fn active_deposits(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
) -> Result<DataOutput<Vec<Deposit>>, AppError> {
    let customer = acting_customer(store, actor).await?;
    Ok(DataOutput::new(store.list_deposits(customer.id, true).await?))
}

pub async fn deposit_history(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
) -> Result<DataOutput<Vec<Deposit>>, AppError> {
    let customer = acting_customer(store, actor).await?;
    Ok(DataOutput::new(store.list_deposits(customer.id, false).await?))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        AMOUNT_PRECISION, INACTIVE_ACCOUNT,
        fixtures::{PASSWORD, customer_actor, funded_customer},
    };
    use app_schema::customer::CustomerStatus;
    use app_store::memory::MemoryStore;
    use rust_decimal::Decimal;

    fn request(amount: i64, term_months: i32) -> PostDepositRequestInput {
        PostDepositRequestInput {
            amount: Decimal::new(amount, 0),
            term_months,
        }
    }

    fn confirm(deposit_id: i64, password: &str) -> PostDepositConfirmInput {
        PostDepositConfirmInput {
            deposit_id,
            password: password.to_owned(),
        }
    }

    #[tokio::test]
    async fn deposit_is_funded_on_confirmation() {
        let store = MemoryStore::default();
        let alice = store.seed_customer(funded_customer(1, "alice", 1000)).await;
        let actor = customer_actor(&alice);

        let pending = request_deposit(&store, Some(&actor), request(300, 6))
            .await
            .unwrap()
            .data;
        assert_eq!(pending.status, DepositStatus::Pending);
        assert!(active_deposits(&store, Some(&actor)).await.unwrap().data.is_empty());

        let active = confirm_deposit(&store, Some(&actor), confirm(pending.id, PASSWORD))
            .await
            .unwrap()
            .data;
        assert_eq!(active.status, DepositStatus::Active);
        assert_eq!(
            store.customer_row(1).await.unwrap().balance,
            Decimal::new(700, 0)
        );
        assert_eq!(active_deposits(&store, Some(&actor)).await.unwrap().data.len(), 1);

        let err = confirm_deposit(&store, Some(&actor), confirm(pending.id, PASSWORD))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[tokio::test]
    async fn request_checks_term_amount_and_balance() {
        let store = MemoryStore::default();
        let alice = store.seed_customer(funded_customer(1, "alice", 100)).await;
        let actor = customer_actor(&alice);
        for input in [request(50, 2), request(0, 3), request(101, 3)] {
            let err = request_deposit(&store, Some(&actor), input).await.unwrap_err();
            assert_eq!(err.status.as_u16(), 400);
        }

        let sub_cent = PostDepositRequestInput {
            amount: Decimal::new(5, 3),
            term_months: 3,
        };
        let err = request_deposit(&store, Some(&actor), sub_cent).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert_eq!(err.message, AMOUNT_PRECISION);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn confirmation_checks_password_and_owner() {
        let store = MemoryStore::default();
        let alice = store.seed_customer(funded_customer(1, "alice", 100)).await;
        let bob = store.seed_customer(funded_customer(2, "bob", 100)).await;
        let pending = request_deposit(&store, Some(&customer_actor(&alice)), request(50, 1))
            .await
            .unwrap()
            .data;

        let wrong_password = confirm(pending.id, "x");
        let err = confirm_deposit(&store, Some(&customer_actor(&alice)), wrong_password)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 403);

        let not_owner = confirm(pending.id, PASSWORD);
        let err = confirm_deposit(&store, Some(&customer_actor(&bob)), not_owner)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 404);
    }

    #[tokio::test]
    async fn blocked_customer_cannot_confirm_a_pending_deposit() {
        let store = MemoryStore::default();
        let alice = store.seed_customer(funded_customer(1, "alice", 100)).await;
        let actor = customer_actor(&alice);
        let pending = request_deposit(&store, Some(&actor), request(50, 1))
            .await
            .unwrap()
            .data;
        store
            .update_customer_status(alice.id, CustomerStatus::Blocked)
            .await
            .unwrap();

        let err = confirm_deposit(&store, Some(&actor), confirm(pending.id, PASSWORD))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(err.message, INACTIVE_ACCOUNT);
        assert_eq!(
            store.customer_row(1).await.unwrap().balance,
            Decimal::new(100, 0)
        );

        let err = store.activate_deposit(pending.id).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
        let row = store.find_deposit(pending.id).await.unwrap().unwrap();
        assert_eq!(row.status, DepositStatus::Pending);
    }

    #[tokio::test]
    async fn history_lists_every_deposit_newest_first() {
        let store = MemoryStore::default();
        let alice = store.seed_customer(funded_customer(1, "alice", 1000)).await;
        let actor = customer_actor(&alice);
        let first = request_deposit(&store, Some(&actor), request(100, 1)).await.unwrap().data;
        let second = request_deposit(&store, Some(&actor), request(200, 12)).await.unwrap().data;
        confirm_deposit(&store, Some(&actor), confirm(first.id, PASSWORD))
            .await
            .unwrap();

        let history = deposit_history(&store, Some(&actor)).await.unwrap().data;
        let ids: Vec<i64> = history.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
