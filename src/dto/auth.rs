use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Role,
};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `CUSTOMER` or `SELLER`.
    pub role: String,
}

/// A registration that passed validation.
#[derive(Debug)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegisterRequest {
    pub fn validate(self) -> AppResult<NewAccount> {
        let mut problems = Vec::new();

        let name = self.name.trim().to_string();
        if name.chars().count() < MIN_NAME_LEN {
            problems.push("name is too short");
        }
        let email = normalize_email(&self.email);
        if !is_valid_email(&email) {
            problems.push("email is invalid");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            problems.push("password must be at least 6 characters");
        }
        let role = match self.role.trim() {
            "CUSTOMER" => Some(Role::Customer),
            "SELLER" => Some(Role::Seller),
            _ => {
                problems.push("role must be CUSTOMER or SELLER");
                None
            }
        };

        match role {
            Some(role) if problems.is_empty() => Ok(NewAccount {
                name,
                email,
                password: self.password,
                role,
            }),
            _ => Err(AppError::validation(problems.join(", "))),
        }
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
