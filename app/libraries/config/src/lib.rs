use app_error::AppError;
use app_log::LogLevel;
use dotenv::dotenv;
use log::*;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_bind: String, // 0.0.0.0:9000
    #[serde(default)]
    pub log_level: LogLevel, // Off, Error, Warn, Info, Debug, Trace
    #[serde(default = "default_pg_connection")]
    pub pg_connection: usize,
    pub redis_url: String, // redis://127.0.0.1:6379
    pub jwt_access_key: String,
    #[serde(default = "default_access_minutes")]
    pub jwt_access_session_minutes: i64,
    pub jwt_refresh_key: String,
    #[serde(default = "default_refresh_days")]
    pub jwt_refresh_session_days: i64,
    #[serde(default = "default_asset_path")]
    pub asset_path: String,
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    #[serde(default = "default_upload_limit")]
    pub upload_limit_bytes: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_bank_id")]
    pub bank_id: String,
    #[serde(default = "default_bank_name")]
    pub bank_name: String,
}

fn default_pg_connection() -> usize {
    5
}

fn default_access_minutes() -> i64 {
    15
}

fn default_refresh_days() -> i64 {
    7
}

fn default_asset_path() -> String {
    "app/assets".to_owned()
}

fn default_upload_path() -> String {
    "uploads/identities".to_owned()
}

fn default_upload_limit() -> usize {
    10 * 1024 * 1024
}

fn default_max_page_size() -> u32 {
    100
}

fn default_bank_id() -> String {
    "A2HL".to_owned()
}

fn default_bank_name() -> String {
    "A2HL Bank".to_owned()
}

impl AppConfig {
    /// Reads the JSON file named by `APP_CONFIG`.
    pub fn new() -> Result<Self, AppError> {
        dotenv().ok();
        let config_file_path = env::var("APP_CONFIG").map_err(|e| {
            debug!("{}", &e);
            AppError::internal(format!(
                "Cannot locate config file; please set APP_CONFIG env variable! {e}"
            ))
        })?;
        Self::from_file(config_file_path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let config_file = fs::File::open(path.as_ref()).map_err(|e| {
            debug!("{}", &e);
            AppError::internal(format!("Cannot read config file! {e}"))
        })?;
        serde_json::from_reader(config_file).map_err(|e| {
            debug!("{}", &e);
            AppError::internal(format!("Cannot parse json! {e}"))
        })
    }

    pub fn database_url() -> Result<String, AppError> {
        env::var("DATABASE_URL").map_err(|e| {
            debug!("{}", e);
            AppError::internal("Cannot locate DATABASE_URL env variable")
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_bind: "127.0.0.1:9000".to_owned(),
            log_level: LogLevel::default(),
            pg_connection: default_pg_connection(),
            redis_url: "redis://127.0.0.1:6379".to_owned(),
            jwt_access_key: "access-secret".to_owned(),
            jwt_access_session_minutes: default_access_minutes(),
            jwt_refresh_key: "refresh-secret".to_owned(),
            jwt_refresh_session_days: default_refresh_days(),
            asset_path: default_asset_path(),
            upload_path: default_upload_path(),
            upload_limit_bytes: default_upload_limit(),
            max_page_size: default_max_page_size(),
            bank_id: default_bank_id(),
            bank_name: default_bank_name(),
        }
    }
}
