//! Self-registration of customers.
//!
//! The multipart body is collected into a [`RegistrationForm`] by the handler
//! and validated here in full before anything is written. A registered
//! customer starts as `pending` until staff approve their identity.

use app_cryptography::{hash::hash, random::account_number};
use app_dto::{customer::CustomerSummary, envelope::DataOutput};
use app_error::AppError;
use app_schema::{customer::NewCustomer, identity::NewIdentity};
use app_store::BankStore;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::*;
use uuid::Uuid;

pub const MISSING_FIELD: &str = "Please provide all required fields!";
pub const INVALID_EMAIL: &str = "Invalid email!";
pub const PASSWORD_MISMATCH: &str = "Password confirmation does not match!";
pub const INVALID_DATE: &str = "Invalid date! Expected DD-MM-YYYY";
pub const IMAGE_COUNT: &str = "Please upload the front and back images of your identity card!";
pub const IMAGE_TYPE: &str = "Only jpg, jpeg and png images are allowed!";

const FRONT_IMAGE: &str = "frontImage";
const BACK_IMAGE: &str = "backImage";
const DATE_FORMAT: &str = "%d-%m-%Y";
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Extension to store the file under. The file name decides when it has
    /// one; browsers posting blobs only send a content type.
    fn extension(&self) -> Option<&'static str> {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match from_name {
            Some(ext) => IMAGE_EXTENSIONS.into_iter().find(|allowed| *allowed == ext),
            None => match self.content_type.as_deref() {
                Some("image/jpeg") | Some("image/jpg") => Some("jpg"),
                Some("image/png") => Some("png"),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub identity_number: Option<String>,
    pub registration_date: Option<String>,
    pub images: Vec<UploadedImage>,
}

impl RegistrationForm {
    /// Stores a text part by its wire name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "username" => &mut self.username,
            "email" => &mut self.email,
            "password" => &mut self.password,
            "confirmPassword" => &mut self.confirm_password,
            "name" => &mut self.name,
            "dateOfBirth" => &mut self.date_of_birth,
            "phoneNumber" => &mut self.phone_number,
            "address" => &mut self.address,
            "identityNumber" => &mut self.identity_number,
            "registrationDate" => &mut self.registration_date,
            _ => return,
        };
        *slot = Some(value);
    }

    pub fn is_image_field(name: &str) -> bool {
        matches!(name, FRONT_IMAGE | BACK_IMAGE)
    }
}

#[derive(Debug)]
struct Registration {
    username: String,
    email: String,
    password: String,
    name: String,
    date_of_birth: NaiveDate,
    phone_number: String,
    address: String,
    identity_number: String,
    registration_date: NaiveDate,
    front: (UploadedImage, &'static str),
    back: (UploadedImage, &'static str),
}

fn required(value: Option<String>) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request(MISSING_FIELD))
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| AppError::bad_request(INVALID_DATE))
}

pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// Picks the front and back images by field name. Each must arrive exactly
/// once and nothing else may be attached.
fn identity_images(
    images: Vec<UploadedImage>,
) -> Result<(UploadedImage, UploadedImage), AppError> {
    let mut front = None;
    let mut back = None;
    for image in images {
        let slot = match image.field.as_str() {
            FRONT_IMAGE => &mut front,
            BACK_IMAGE => &mut back,
            _ => return Err(AppError::bad_request(IMAGE_COUNT)),
        };
        if slot.replace(image).is_some() {
            return Err(AppError::bad_request(IMAGE_COUNT));
        }
    }
    match (front, back) {
        (Some(front), Some(back)) => Ok((front, back)),
        _ => Err(AppError::bad_request(IMAGE_COUNT)),
    }
}

fn validate(form: RegistrationForm) -> Result<Registration, AppError> {
    let username = required(form.username)?;
    let email = required(form.email)?.to_lowercase();
    // Passwords are taken verbatim.
    let password = form
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::bad_request(MISSING_FIELD))?;
    let name = required(form.name)?;
    let date_of_birth = required(form.date_of_birth)?;
    let phone_number = required(form.phone_number)?;
    let address = required(form.address)?;
    let identity_number = required(form.identity_number)?;
    let registration_date = required(form.registration_date)?;

    if !is_email(&email) {
        return Err(AppError::bad_request(INVALID_EMAIL));
    }
    if let Some(confirm) = &form.confirm_password
        && confirm != &password
    {
        return Err(AppError::bad_request(PASSWORD_MISMATCH));
    }

    let (front, back) = identity_images(form.images)?;
    let front_ext = front
        .extension()
        .ok_or_else(|| AppError::bad_request(IMAGE_TYPE))?;
    let back_ext = back
        .extension()
        .ok_or_else(|| AppError::bad_request(IMAGE_TYPE))?;

    Ok(Registration {
        username,
        email,
        password,
        name,
        date_of_birth: parse_date(&date_of_birth)?,
        phone_number,
        address,
        identity_number,
        registration_date: parse_date(&registration_date)?,
        front: (front, front_ext),
        back: (back, back_ext),
    })
}

async fn save_image(dir: &Path, image: &UploadedImage, ext: &str) -> Result<PathBuf, AppError> {
    let path = dir.join(format!("{}.{}", Uuid::new_v4(), ext));
    fs::write(&path, &image.bytes).await?;
    Ok(path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Validates the form, stores both identity images under `upload_dir`, and
/// creates the customer with their identity record.
pub async fn register_customer(
    store: &dyn BankStore,
    form: RegistrationForm,
    upload_dir: &Path,
) -> Result<DataOutput<CustomerSummary>, AppError> {
    let reg = validate(form)?;
    let password_hash = hash(&reg.password)?;

    fs::create_dir_all(upload_dir).await?;
    let front = save_image(upload_dir, &reg.front.0, reg.front.1).await?;
    let back = match save_image(upload_dir, &reg.back.0, reg.back.1).await {
        Ok(path) => path,
        Err(e) => {
            let _ = fs::remove_file(&front).await;
            return Err(e);
        }
    };

    let created = store
        .create_customer(
            NewCustomer {
                username: reg.username,
                email: reg.email,
                name: reg.name,
                date_of_birth: reg.date_of_birth,
                phone_number: reg.phone_number,
                address: reg.address,
                password_hash,
                account_number: account_number(),
            },
            NewIdentity {
                identity_number: reg.identity_number,
                registration_date: reg.registration_date,
                front_image: file_name(&front),
                back_image: file_name(&back),
            },
        )
        .await;

    match created {
        Ok((customer, identity)) => {
            info!(
                "Customer {} registered with identity {}",
                customer.id, identity.id
            );
            Ok(DataOutput::new(customer.into()))
        }
        Err(e) => {
            for path in [&front, &back] {
                let _ = fs::remove_file(path).await;
            }
            Err(e)
        }
    }
}
