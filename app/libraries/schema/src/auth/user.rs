use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Customer,
}

/// The actor behind a request, decoded from its access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub session: u64,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    /// Customer primary key, when the actor is a customer.
    pub fn customer_id(&self) -> Option<i64> {
        match self.role {
            Role::Customer => self.id.parse().ok(),
            Role::Staff => None,
        }
    }

    /// Staff primary key, when the actor is staff.
    pub fn staff_id(&self) -> Option<uuid::Uuid> {
        match self.role {
            Role::Staff => self.id.parse().ok(),
            Role::Customer => None,
        }
    }

    /// Session-store key holding this actor's refresh token.
    pub fn session_key(&self) -> String {
        format!("{}:{}", &self.email, self.session)
    }
}
