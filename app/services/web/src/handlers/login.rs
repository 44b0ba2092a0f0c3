use app_bank::auth::{authenticate_customer, authenticate_staff};
use app_dto::{
    auth::login::{PostLoginInput, PostLoginOutput},
    envelope::MessageOutput,
};
use app_error::AppError;
use app_middleware::{issue_tokens, revoke_session};
use app_schema::auth::user::AuthUser;
use app_state::AppState;
use axum::extract::{Extension, Json, State};
use std::sync::Arc;

pub async fn post_customer_login(
    State(state): State<Arc<AppState>>,
    Json(args): Json<PostLoginInput>,
) -> Result<Json<PostLoginOutput>, AppError> {
    let user = authenticate_customer(state.store.as_ref(), &args).await?;
    Ok(Json(issue_tokens(&state, &user).await?))
}

pub async fn post_staff_login(
    State(state): State<Arc<AppState>>,
    Json(args): Json<PostLoginInput>,
) -> Result<Json<PostLoginOutput>, AppError> {
    let user = authenticate_staff(state.store.as_ref(), &args).await?;
    Ok(Json(issue_tokens(&state, &user).await?))
}

pub async fn post_logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessageOutput>, AppError> {
    revoke_session(&state, &user).await?;
    Ok(Json(MessageOutput::new("Logged out")))
}
