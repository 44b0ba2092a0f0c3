use crate::registration::{INVALID_EMAIL, MISSING_FIELD, is_email};
use app_cryptography::hash::hash;
use app_dto::{
    auth::staff::{PostStaffInput, StaffOutput},
    envelope::DataOutput,
};
use app_error::AppError;
use app_schema::auth::staff::NewStaff;
use app_store::BankStore;
use tracing::*;

pub async fn create_staff(
    store: &dyn BankStore,
    input: PostStaffInput,
) -> Result<DataOutput<StaffOutput>, AppError> {
    let username = input.username.trim();
    let name = input.name.trim();
    let email = input.email.trim().to_lowercase();
    if username.is_empty() || name.is_empty() || input.password.is_empty() {
        return Err(AppError::bad_request(MISSING_FIELD));
    }
    if !is_email(&email) {
        return Err(AppError::bad_request(INVALID_EMAIL));
    }
    let password_hash = hash(&input.password)?;
    let staff = store
        .create_staff(NewStaff {
            username: username.to_owned(),
            email,
            name: name.to_owned(),
            password_hash,
        })
        .await?;
    debug!("INSERT staff: {}", &staff.email);
    Ok(DataOutput::new(staff.into()))
}
