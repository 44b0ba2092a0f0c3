use app_schema::auth::staff::Staff;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize)]
pub struct PostStaffInput {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffOutput {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Staff> for StaffOutput {
    fn from(staff: Staff) -> Self {
        Self {
            id: staff.id,
            username: staff.username,
            name: staff.name,
            email: staff.email,
            created_at: staff.created_at,
        }
    }
}
