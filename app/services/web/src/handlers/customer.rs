use app_bank::{
    deposits, profile,
    registration::{RegistrationForm, UploadedImage, register_customer},
    transactions::{self, BankRef},
};
use app_dto::{
    customer::{AccountOutput, CustomerSummary, PutProfileInput, PutUpdatePasswordInput},
    deposit::{PostDepositConfirmInput, PostDepositRequestInput},
    envelope::{DataOutput, ListOutput, MessageOutput},
    transaction::{GetHistoryQuery, PostTransferConfirmInput, PostTransferRequestInput},
};
use app_error::AppError;
use app_middleware::revoke_session;
use app_schema::{auth::user::AuthUser, deposit::Deposit, transaction::Transaction};
use app_state::AppState;
use axum::{
    extract::{Extension, Json, Multipart, Query, State},
    http::StatusCode,
};
use std::{path::Path, sync::Arc};
use tracing::*;

type Actor = Option<Extension<AuthUser>>;

fn actor(user: &Actor) -> Option<&AuthUser> {
    user.as_ref().map(|Extension(u)| u)
}

pub async fn post_register(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DataOutput<CustomerSummary>>), AppError> {
    let mut form = RegistrationForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if RegistrationForm::is_image_field(&name) {
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await?;
            form.images.push(UploadedImage {
                field: name,
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await?;
            form.set(&name, value);
        }
    }
    debug!("Registration for {:?}", &form.username);
    let out = register_customer(
        state.store.as_ref(),
        form,
        Path::new(&state.config.upload_path),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(out)))
}

pub async fn get_me(
    State(state): State<Arc<AppState>>,
    user: Actor,
) -> Result<Json<DataOutput<CustomerSummary>>, AppError> {
    Ok(Json(profile::me(state.store.as_ref(), actor(&user)).await?))
}

pub async fn put_me(
    State(state): State<Arc<AppState>>,
    user: Actor,
    Json(args): Json<PutProfileInput>,
) -> Result<Json<DataOutput<CustomerSummary>>, AppError> {
    Ok(Json(
        profile::update_me(state.store.as_ref(), actor(&user), args).await?,
    ))
}

pub async fn put_update_password(
    State(state): State<Arc<AppState>>,
    user: Actor,
    Json(args): Json<PutUpdatePasswordInput>,
) -> Result<Json<MessageOutput>, AppError> {
    let out = profile::update_password(state.store.as_ref(), actor(&user), args).await?;
    if let Some(user) = actor(&user) {
        revoke_session(&state, user).await?;
    }
    Ok(Json(out))
}

pub async fn get_account(
    State(state): State<Arc<AppState>>,
    user: Actor,
) -> Result<Json<DataOutput<AccountOutput>>, AppError> {
    Ok(Json(profile::account(state.store.as_ref(), actor(&user)).await?))
}

pub async fn get_transaction_history(
    State(state): State<Arc<AppState>>,
    user: Actor,
    Query(params): Query<GetHistoryQuery>,
) -> Result<Json<ListOutput<Transaction>>, AppError> {
    Ok(Json(
        transactions::transaction_history(
            state.store.as_ref(),
            actor(&user),
            &params,
            state.max_page_size(),
        )
        .await?,
    ))
}

pub async fn post_internal_transfer_request(
    State(state): State<Arc<AppState>>,
    user: Actor,
    Json(args): Json<PostTransferRequestInput>,
) -> Result<(StatusCode, Json<DataOutput<Transaction>>), AppError> {
    let bank = BankRef {
        id: &state.config.bank_id,
        name: &state.config.bank_name,
    };
    let out =
        transactions::request_internal_transfer(state.store.as_ref(), actor(&user), args, bank)
            .await?;
    Ok((StatusCode::CREATED, Json(out)))
}

pub async fn post_internal_transfer_confirm(
    State(state): State<Arc<AppState>>,
    user: Actor,
    Json(args): Json<PostTransferConfirmInput>,
) -> Result<Json<DataOutput<Transaction>>, AppError> {
    Ok(Json(
        transactions::confirm_internal_transfer(state.store.as_ref(), actor(&user), args).await?,
    ))
}

pub async fn post_deposit_request(
    State(state): State<Arc<AppState>>,
    user: Actor,
    Json(args): Json<PostDepositRequestInput>,
) -> Result<(StatusCode, Json<DataOutput<Deposit>>), AppError> {
    let out = deposits::request_deposit(state.store.as_ref(), actor(&user), args).await?;
    Ok((StatusCode::CREATED, Json(out)))
}

pub async fn post_deposit_confirm(
    State(state): State<Arc<AppState>>,
    user: Actor,
    Json(args): Json<PostDepositConfirmInput>,
) -> Result<Json<DataOutput<Deposit>>, AppError> {
    Ok(Json(
        deposits::confirm_deposit(state.store.as_ref(), actor(&user), args).await?,
    ))
}

pub async fn get_deposits(
    State(state): State<Arc<AppState>>,
    user: Actor,
) -> Result<Json<DataOutput<Vec<Deposit>>>, AppError> {
    Ok(Json(
        deposits::active_deposits(state.store.as_ref(), actor(&user)).await?,
    ))
}

pub async fn get_deposit_history(
    State(state): State<Arc<AppState>>,
    user: Actor,
) -> Result<Json<DataOutput<Vec<Deposit>>>, AppError> {
    Ok(Json(
        deposits::deposit_history(state.store.as_ref(), actor(&user)).await?,
    ))
}
