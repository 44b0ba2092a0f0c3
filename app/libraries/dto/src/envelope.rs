use serde::Serialize;

pub const SUCCESS: &str = "success";

/// `{status:'success', data}`
#[derive(Debug, Serialize)]
pub struct DataOutput<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> DataOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: SUCCESS,
            data,
        }
    }
}

/// `{status:'success', message}`
#[derive(Debug, Serialize)]
pub struct MessageOutput {
    pub status: &'static str,
    pub message: String,
}

impl MessageOutput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: SUCCESS,
            message: message.into(),
        }
    }
}

/// Listing envelope. `items` and `totalItems` are always present; an empty
/// page additionally carries a human-readable `message`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOutput<T> {
    pub status: &'static str,
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
