use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub user_id: Uuid,
    pub login: String,
    pub password_hash: String,
}

// The row as stored in the users table
#[derive(sqlx::FromRow, Debug)]
pub struct UserRow {
    pub user_id: String,
    pub login: String,
    pub password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&row.user_id)
            .map_err(|err| StoreError::Corrupt(format!("user_id: {err}")))?;
        Ok(User { user_id, login: row.login, password_hash: row.password_hash })
    }
}

// The struct used for receiving login and password as json, both for register and login.
// Fields are optional so a missing one can be answered with our own message
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Credentials {
    pub login: Option<String>,
    pub password: Option<String>,
}

// The struct used for receiving a refresh token as json
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

// The struct used to respond to a registration
#[derive(Deserialize, Serialize, Debug)]
pub struct SignUpResponse {
    pub success: bool,
    pub message: String,
}

// The struct used to respond with an access and refresh token pair
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AuthResponse {
    #[serde(rename = "type")]
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
}

// The public view on a user
#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct UserInfo {
    pub user_id: Uuid,
    pub login: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo { user_id: user.user_id, login: user.login.clone() }
    }
}
