use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PostLoginInput {
    /// Email address; customers may also log in with their username.
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLoginOutput {
    pub access_token: String,
    pub refresh_token: String,
}
