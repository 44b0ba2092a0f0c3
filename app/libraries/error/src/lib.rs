use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bcrypt::BcryptError;
use deadpool_redis::{CreatePoolError, PoolError, redis::RedisError};
use jsonwebtoken::errors::Error as JwtError;
use log::warn;
use serde::Serialize;
use serde_json::Error as JsonError;
use sqlx::{Error as SqlxError, migrate::MigrateError};
use std::{error::Error as StdError, fmt, io::Error as IoError};

pub static SYSTEM_ERROR_CODE: i64 = -1000;
pub static SYSTEM_ERROR_CODE_DB: i64 = -1001;
pub static SYSTEM_ERROR_CODE_IO: i64 = -1002;
pub static SYSTEM_ERROR_CODE_CRYPTO: i64 = -1003;
pub static SYSTEM_ERROR_CODE_JSON: i64 = -1004;
pub static SYSTEM_ERROR_CODE_SESSION: i64 = -1005;
pub static SYSTEM_ERROR_CODE_TEMPLATE: i64 = -1006;

// Domain failures
pub static ERROR_CODE_VALIDATION: i64 = 1;
pub static ERROR_CODE_AUTH: i64 = 2;
pub static ERROR_CODE_NOT_FOUND: i64 = 3;
pub static ERROR_CODE_CONFLICT: i64 = 4;
pub static ERROR_CODE_FUNDS: i64 = 5;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub message: String,
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub code: i64,
}

fn serialize_status<S>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_u16(status.as_u16())
}

impl AppError {
    pub fn new(message: impl Into<String>, status: StatusCode, code: i64) -> Self {
        Self {
            message: message.into(),
            status,
            code,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            message,
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE,
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST, ERROR_CODE_VALIDATION)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::UNAUTHORIZED, ERROR_CODE_AUTH)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::FORBIDDEN, ERROR_CODE_AUTH)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::NOT_FOUND, ERROR_CODE_NOT_FOUND)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::CONFLICT, ERROR_CODE_CONFLICT)
    }

    pub fn insufficient_funds() -> Self {
        Self::new(
            "Your balance is not enough for this operation!",
            StatusCode::BAD_REQUEST,
            ERROR_CODE_FUNDS,
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"{{"message":"{}","status":{},"code":{}}}"#,
            self.message,
            self.status.as_u16(),
            self.code
        )
    }
}

impl StdError for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        warn!(
            "AppError ({}): {} (HTTP {})",
            self.code,
            self.message,
            self.status.as_u16()
        );
        (self.status, Json(self)).into_response()
    }
}

// --------------------
// Error conversions
// --------------------

impl From<SqlxError> for AppError {
    fn from(value: SqlxError) -> Self {
        match &value {
            SqlxError::RowNotFound => Self::not_found("Record not found"),
            SqlxError::Database(db) if db.is_unique_violation() => {
                Self::conflict(format!("Record already exists: {}", db.message()))
            }
            _ => Self::new(
                format!("{value:?}"),
                StatusCode::INTERNAL_SERVER_ERROR,
                SYSTEM_ERROR_CODE_DB,
            ),
        }
    }
}

impl From<MigrateError> for AppError {
    fn from(value: MigrateError) -> Self {
        Self::new(
            format!("Migration failed: {value}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_DB,
        )
    }
}

impl From<RedisError> for AppError {
    fn from(value: RedisError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_SESSION,
        )
    }
}

impl From<CreatePoolError> for AppError {
    fn from(value: CreatePoolError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_SESSION,
        )
    }
}

impl From<PoolError> for AppError {
    fn from(value: PoolError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_SESSION,
        )
    }
}

impl From<IoError> for AppError {
    fn from(value: IoError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_IO,
        )
    }
}

impl From<JsonError> for AppError {
    fn from(value: JsonError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_JSON,
        )
    }
}

impl From<JwtError> for AppError {
    fn from(value: JwtError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::UNAUTHORIZED,
            SYSTEM_ERROR_CODE_CRYPTO,
        )
    }
}

impl From<BcryptError> for AppError {
    fn from(value: BcryptError) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_CRYPTO,
        )
    }
}

impl From<MultipartError> for AppError {
    fn from(value: MultipartError) -> Self {
        Self::new(value.body_text(), value.status(), ERROR_CODE_VALIDATION)
    }
}

impl From<askama::Error> for AppError {
    fn from(value: askama::Error) -> Self {
        Self::new(
            format!("{value:?}"),
            StatusCode::INTERNAL_SERVER_ERROR,
            SYSTEM_ERROR_CODE_TEMPLATE,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn serializes_status_as_number() {
        let err = AppError::not_found("Can't find this customer!");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["code"], ERROR_CODE_NOT_FOUND);
        assert_eq!(json["message"], "Can't find this customer!");
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err = AppError::from(SqlxError::RowNotFound);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn response_carries_status() {
        let res = AppError::bad_request("Invalid status!").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
