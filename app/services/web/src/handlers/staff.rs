use app_bank::{customers, identities, staff, transactions};
use app_dto::{
    auth::staff::{PostStaffInput, StaffOutput},
    customer::{
        CustomerDetailOutput, CustomerSummary, GetCustomersQuery, PostApproveCustomerInput,
        PutCustomerStatusInput,
    },
    envelope::{DataOutput, ListOutput, MessageOutput},
    transaction::GetTransactionsQuery,
};
use app_error::AppError;
use app_schema::{auth::user::AuthUser, transaction::Transaction};
use app_state::AppState;
use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

pub async fn get_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GetCustomersQuery>,
) -> Result<Json<ListOutput<CustomerSummary>>, AppError> {
    Ok(Json(
        customers::list_customers(state.store.as_ref(), &params, state.max_page_size()).await?,
    ))
}

pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DataOutput<CustomerDetailOutput>>, AppError> {
    Ok(Json(
        customers::customer_detail(state.store.as_ref(), id).await?,
    ))
}

pub async fn put_customer_status(
    State(state): State<Arc<AppState>>,
    Json(args): Json<PutCustomerStatusInput>,
) -> Result<Json<DataOutput<CustomerSummary>>, AppError> {
    Ok(Json(
        customers::update_customer_status(state.store.as_ref(), args).await?,
    ))
}

pub async fn post_approve_customer(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<AuthUser>>,
    Json(args): Json<PostApproveCustomerInput>,
) -> Result<Json<MessageOutput>, AppError> {
    let actor = user.as_ref().map(|Extension(u)| u);
    Ok(Json(
        identities::approve_identity(state.store.as_ref(), actor, args).await?,
    ))
}

pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GetTransactionsQuery>,
) -> Result<Json<ListOutput<Transaction>>, AppError> {
    Ok(Json(
        transactions::list_transactions(state.store.as_ref(), &params, state.max_page_size())
            .await?,
    ))
}

pub async fn post_staff_user(
    State(state): State<Arc<AppState>>,
    Json(args): Json<PostStaffInput>,
) -> Result<(StatusCode, Json<DataOutput<StaffOutput>>), AppError> {
    let out = staff::create_staff(state.store.as_ref(), args).await?;
    Ok((StatusCode::CREATED, Json(out)))
}
