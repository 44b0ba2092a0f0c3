use crate::list_output;
use app_dto::{
    customer::{CustomerDetailOutput, CustomerSummary, GetCustomersQuery, PutCustomerStatusInput},
    envelope::{DataOutput, ListOutput},
};
use app_error::AppError;
use app_query::{CustomerField, CustomerQuery, Page};
use app_schema::customer::CustomerStatus;
use app_store::BankStore;
use tracing::*;

pub const INVALID_STATUS: &str = "Invalid status!";
pub const CUSTOMER_NOT_FOUND: &str = "Can't find this customer!";
pub const EMPTY_LISTING: &str = "Customer not found!";

/// Resolves a status name; `deleted` is never a valid target.
pub fn parse_target_status(name: &str) -> Result<CustomerStatus, AppError> {
    match CustomerStatus::from_name(name) {
        Some(CustomerStatus::Deleted) | None => Err(AppError::bad_request(INVALID_STATUS)),
        Some(status) => Ok(status),
    }
}

pub async fn update_customer_status(
    store: &dyn BankStore,
    input: PutCustomerStatusInput,
) -> Result<DataOutput<CustomerSummary>, AppError> {
    let status = parse_target_status(&input.status)?;
    let customer = store
        .update_customer_status(input.id_customer, status)
        .await?
        .ok_or_else(|| AppError::not_found(CUSTOMER_NOT_FOUND))?;
    info!("Customer {} status set to {}", customer.id, status.as_str());
    Ok(DataOutput::new(customer.into()))
}

pub fn customer_query(params: &GetCustomersQuery, max_page_size: u32) -> CustomerQuery {
    let page = Page::parse(
        params.page.as_deref(),
        params.limit.as_deref(),
        max_page_size,
    );
    CustomerQuery::new(page)
        .sort(params.sort_by.as_deref(), params.sort_type.as_deref())
        .filter(CustomerField::Username, params.username.as_deref())
        .filter(CustomerField::Email, params.email.as_deref())
        .filter(CustomerField::Name, params.name.as_deref())
        .filter(CustomerField::PhoneNumber, params.phone_number.as_deref())
        .filter(CustomerField::Address, params.address.as_deref())
}

pub async fn list_customers(
    store: &dyn BankStore,
    params: &GetCustomersQuery,
    max_page_size: u32,
) -> Result<ListOutput<CustomerSummary>, AppError> {
    let query = customer_query(params, max_page_size);
    debug!("{:?}", &query);
    let paged = store.list_customers(&query).await?;
    Ok(list_output(query.page, paged, EMPTY_LISTING))
}

pub async fn customer_detail(
    store: &dyn BankStore,
    id: i64,
) -> Result<DataOutput<CustomerDetailOutput>, AppError> {
    let customer = store
        .find_customer(id)
        .await?
        .ok_or_else(|| AppError::not_found(CUSTOMER_NOT_FOUND))?;
    let identity = store.find_identity_by_customer(id).await?;
    Ok(DataOutput::new(CustomerDetailOutput {
        customer: customer.into(),
        identity,
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::{customer, identity};
    use app_store::memory::MemoryStore;

    fn status_input(id: i64, status: &str) -> PutCustomerStatusInput {
        PutCustomerStatusInput {
            id_customer: id,
            status: status.to_owned(),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::default();
        for (id, username, status) in [
            (1, "carol", CustomerStatus::Active),
            (2, "alice", CustomerStatus::Pending),
            (3, "bob", CustomerStatus::Blocked),
            (4, "dave", CustomerStatus::Deleted),
        ] {
            store.seed_customer(customer(id, username, status)).await;
        }
        store
    }

    #[tokio::test]
    async fn invalid_or_deleted_status_is_rejected_without_touching_the_store() {
        let store = seeded().await;
        for bad in ["deleted", "frozen", "", "Active"] {
            let err = update_customer_status(&store, status_input(1, bad))
                .await
                .unwrap_err();
            assert_eq!(err.status.as_u16(), 400, "status {bad:?}");
            assert_eq!(err.message, INVALID_STATUS);
        }
        assert_eq!(store.calls(), 0);
        let row = store.customer_row(1).await.unwrap();
        assert_eq!(row.status, CustomerStatus::Active);
    }

    #[tokio::test]
    async fn valid_status_is_persisted_and_returned() {
        let store = seeded().await;
        let out = update_customer_status(&store, status_input(2, "blocked"))
            .await
            .unwrap();
        assert_eq!(out.status, "success");
        assert_eq!(out.data.status, CustomerStatus::Blocked);
        assert_eq!(
            store.customer_row(2).await.unwrap().status,
            CustomerStatus::Blocked
        );
    }

    #[tokio::test]
    async fn missing_or_deleted_customer_is_not_found() {
        let store = seeded().await;
        for (id, status) in [(99, "active"), (4, "active"), (4, "blocked")] {
            let err = update_customer_status(&store, status_input(id, status))
                .await
                .unwrap_err();
            assert_eq!(err.status.as_u16(), 404);
            assert_eq!(err.message, CUSTOMER_NOT_FOUND);
        }
        assert_eq!(
            store.customer_row(4).await.unwrap().status,
            CustomerStatus::Deleted
        );
    }

    #[tokio::test]
    async fn default_listing_is_first_ten_by_username() {
        let store = MemoryStore::default();
        for id in 1..=15 {
            let username = format!("user{:02}", 16 - id);
            store
                .seed_customer(customer(id, &username, CustomerStatus::Active))
                .await;
        }
        let out = list_customers(&store, &GetCustomersQuery::default(), 100)
            .await
            .unwrap();
        assert_eq!(out.items.len(), 10);
        assert_eq!(out.total_items, 15);
        assert_eq!(out.total_pages, 2);
        let names: Vec<&str> = out.items.iter().map(|c| c.username.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "user01");
        assert!(out.message.is_none());
    }

    #[tokio::test]
    async fn listing_excludes_deleted_and_honours_filters() {
        let store = seeded().await;
        let params = GetCustomersQuery {
            username: Some("A".to_owned()),
            ..Default::default()
        };
        let out = list_customers(&store, &params, 100).await.unwrap();
        let names: Vec<&str> = out.items.iter().map(|c| c.username.as_str()).collect();
        // "dave" matches but is soft-deleted.
        assert_eq!(names, vec!["alice", "carol"]);
        assert_eq!(out.total_items, 2);
    }

    #[tokio::test]
    async fn listing_sorts_descending_on_request() {
        let store = seeded().await;
        let params = GetCustomersQuery {
            sort_by: Some("username".to_owned()),
            sort_type: Some("desc".to_owned()),
            ..Default::default()
        };
        let out = list_customers(&store, &params, 100).await.unwrap();
        let names: Vec<&str> = out.items.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, vec!["carol", "bob", "alice"]);
    }

    #[tokio::test]
    async fn empty_listing_keeps_the_list_shape() {
        let store = seeded().await;
        let params = GetCustomersQuery {
            email: Some("nobody".to_owned()),
            ..Default::default()
        };
        let out = list_customers(&store, &params, 100).await.unwrap();
        assert!(out.items.is_empty());
        assert_eq!(out.total_items, 0);
        assert_eq!(out.message.as_deref(), Some(EMPTY_LISTING));
    }

    #[tokio::test]
    async fn second_page_reports_real_total() {
        let store = seeded().await;
        let params = GetCustomersQuery {
            page: Some("2".to_owned()),
            limit: Some("2".to_owned()),
            ..Default::default()
        };
        let out = list_customers(&store, &params, 100).await.unwrap();
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.total_items, 3);
        assert_eq!(out.total_pages, 2);
    }

    #[tokio::test]
    async fn detail_includes_identity() {
        let store = seeded().await;
        store.seed_identity(identity(10, 2)).await;
        let out = customer_detail(&store, 2).await.unwrap();
        assert_eq!(out.data.customer.username, "alice");
        assert_eq!(out.data.identity.unwrap().id, 10);

        let err = customer_detail(&store, 4).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 404);
    }
}
