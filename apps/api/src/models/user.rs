use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fully stamped row ready for insertion. The store assigns `id`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for create and update requests.
///
/// On update `username`, `email` and `fullName` replace the stored values;
/// an omitted `isActive` keeps the stored flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UserInput {
    /// Rejects blank required fields and trims surrounding whitespace.
    pub fn normalized(self) -> Result<Self, AppError> {
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("username is required".to_string()));
        }
        if email.is_empty() {
            return Err(AppError::Validation("email is required".to_string()));
        }
        Ok(UserInput {
            username,
            email,
            full_name: self
                .full_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            is_active: self.is_active,
        })
    }
}
