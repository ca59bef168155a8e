use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Staff,
    Admin,
}

impl UserRole {
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Staff | UserRole::Admin)
    }
}

/// The slice of a user profile this service reads: identity, role and reservation category.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: &str, username: &str, role: UserRole, category: Option<&str>) -> Self {
        User {
            id: id.to_string(),
            username: username.to_string(),
            role,
            category: category.map(str::to_string),
            created_at: Some(Utc::now()),
        }
    }
}
