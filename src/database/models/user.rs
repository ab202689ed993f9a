use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::query_builder::{FieldChanges, SqlValue};

pub const COLUMN_NAMES: &[(&str, &str)] = &[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
];

pub const COLUMNS: &str =
    r#"username, first_name AS "firstName", last_name AS "lastName", email, is_admin AS "isAdmin""#;

/// Public user view. The password hash never leaves the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[sqlx(rename = "firstName")]
    pub first_name: String,
    #[sqlx(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[sqlx(rename = "isAdmin")]
    pub is_admin: bool,
}

/// Stored row including the password hash, used only to check credentials
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    #[sqlx(flatten)]
    pub user: User,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Plain text; hashed before it is stored
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    /// Field changes excluding the password, which the service hashes and appends
    pub fn changes(&self) -> FieldChanges {
        let mut changes: FieldChanges = Vec::new();
        if let Some(v) = &self.first_name {
            changes.push(("firstName", SqlValue::from(v.as_str())));
        }
        if let Some(v) = &self.last_name {
            changes.push(("lastName", SqlValue::from(v.as_str())));
        }
        if let Some(v) = &self.email {
            changes.push(("email", SqlValue::from(v.as_str())));
        }
        if let Some(v) = self.is_admin {
            changes.push(("isAdmin", SqlValue::from(v)));
        }
        changes
    }
}
