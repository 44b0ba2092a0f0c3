use crate::handlers::{customer::*, login::*, pages::*, ping::*, staff::*};
use app_middleware::{customer_only, staff_only, web_auth_middleware};
use app_state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub fn router(state: Arc<AppState>) -> Router {
    let asset_path = state.config.asset_path.clone();
    let asset_service = ServeDir::new(&asset_path).append_index_html_on_directories(true);
    let auth = middleware::from_fn_with_state(state.clone(), web_auth_middleware);

    let customers = Router::new()
        .route(
            "/register",
            post(post_register).layer(DefaultBodyLimit::max(state.config.upload_limit_bytes)),
        )
        .route("/login", post(post_customer_login))
        .merge(
            Router::new()
                .route("/me", get(get_me).put(put_me))
                .route("/updatePassword", put(put_update_password))
                .route("/account", get(get_account))
                .route("/transactionHistory", get(get_transaction_history))
                .route(
                    "/internalTransferRequest",
                    post(post_internal_transfer_request),
                )
                .route(
                    "/internalTransferConfirm",
                    post(post_internal_transfer_confirm),
                )
                .route("/depositRegisterRequest", post(post_deposit_request))
                .route("/depositRegisterConfirm", post(post_deposit_confirm))
                .route("/deposit", get(get_deposits))
                .route("/depositHistory", get(get_deposit_history))
                .layer(middleware::from_fn(customer_only))
                .layer(auth.clone()),
        );

    let staff = Router::new()
        .route("/login", post(post_staff_login))
        .merge(
            Router::new()
                .route("/customers", get(get_customers))
                .route("/customers/status", put(put_customer_status))
                .route("/customers/approve", post(post_approve_customer))
                .route("/customers/{id}", get(get_customer))
                .route("/transactions", get(get_transactions))
                .route("/users", post(post_staff_user))
                .layer(middleware::from_fn(staff_only))
                .layer(auth.clone()),
        );

    Router::new()
        .route("/ping", get(ping))
        .route("/login", get(get_login))
        .route("/register", get(get_register))
        .route("/admin/customers", get(get_admin_customers))
        .route("/admin/transactions", get(get_admin_transactions))
        .nest("/customers", customers)
        .nest("/staff", staff)
        .nest(
            "/auth",
            Router::new()
                .route("/logout", post(post_logout))
                .layer(auth),
        )
        .nest_service("/assets", asset_service)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
