use app_dto::{customer::PostApproveCustomerInput, envelope::MessageOutput};
use app_error::AppError;
use app_schema::auth::user::AuthUser;
use app_store::BankStore;
use tracing::*;

pub use crate::NOT_LOGGED_IN;
pub const IDENTITY_NOT_FOUND: &str = "Customer not found";
pub const ALREADY_APPROVED: &str = "Customer has already been approved";
pub const APPROVED: &str = "Customer have been approved";

/// Records `actor` as the approver of the customer's identity.
///
/// Authorization is decided before the store is consulted at all: without a
/// staff actor nothing is read or written.
pub async fn approve_identity(
    store: &dyn BankStore,
    actor: Option<&AuthUser>,
    input: PostApproveCustomerInput,
) -> Result<MessageOutput, AppError> {
    let staff_id = actor
        .and_then(AuthUser::staff_id)
        .ok_or_else(|| AppError::unauthorized(NOT_LOGGED_IN))?;

    let identity = store
        .find_identity_by_customer(input.customer_id)
        .await?
        .ok_or_else(|| AppError::not_found(IDENTITY_NOT_FOUND))?;
    if identity.is_approved() {
        return Err(AppError::conflict(ALREADY_APPROVED));
    }

    store
        .approve_identity(identity.id, staff_id)
        .await?
        .ok_or_else(|| AppError::conflict(ALREADY_APPROVED))?;
    info!(
        "Identity {} of customer {} approved by {}",
        identity.id, input.customer_id, staff_id
    );
    Ok(MessageOutput::new(APPROVED))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::{customer, customer_actor, identity, staff, staff_actor};
    use app_schema::customer::CustomerStatus;
    use app_store::memory::MemoryStore;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::default();
        store
            .seed_customer(customer(1, "alice", CustomerStatus::Pending))
            .await;
        store
            .seed_customer(customer(2, "bob", CustomerStatus::Deleted))
            .await;
        store.seed_identity(identity(11, 1)).await;
        store.seed_identity(identity(12, 2)).await;
        store
    }

    fn input(customer_id: i64) -> PostApproveCustomerInput {
        PostApproveCustomerInput { customer_id }
    }

    #[tokio::test]
    async fn anonymous_approval_is_rejected_before_any_query() {
        let store = seeded().await;
        let err = approve_identity(&store, None, input(1)).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.message, NOT_LOGGED_IN);
        assert_eq!(store.calls(), 0);
        assert!(store.identity_row(11).await.unwrap().staff_id_approved.is_none());
    }

    #[tokio::test]
    async fn customers_cannot_approve() {
        let store = seeded().await;
        let alice = store.customer_row(1).await.unwrap();
        let actor = customer_actor(&alice);
        let err = approve_identity(&store, Some(&actor), input(1))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn staff_approval_records_approver_and_activates() {
        let store = seeded().await;
        let teller = staff();
        let out = approve_identity(&store, Some(&staff_actor(&teller)), input(1))
            .await
            .unwrap();
        assert_eq!(out.message, APPROVED);
        let row = store.identity_row(11).await.unwrap();
        assert_eq!(row.staff_id_approved, Some(teller.id));
        assert!(row.approved_at.is_some());
        assert_eq!(
            store.customer_row(1).await.unwrap().status,
            CustomerStatus::Active
        );
    }

    #[tokio::test]
    async fn second_approval_conflicts() {
        let store = seeded().await;
        let actor = staff_actor(&staff());
        approve_identity(&store, Some(&actor), input(1)).await.unwrap();
        let err = approve_identity(&store, Some(&actor), input(1))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[tokio::test]
    async fn unknown_or_deleted_customer_is_not_found() {
        let store = seeded().await;
        let actor = staff_actor(&staff());
        for id in [2, 99] {
            let err = approve_identity(&store, Some(&actor), input(id))
                .await
                .unwrap_err();
            assert_eq!(err.status.as_u16(), 404);
            assert_eq!(err.message, IDENTITY_NOT_FOUND);
        }
        assert!(store.identity_row(12).await.unwrap().staff_id_approved.is_none());
    }
}
