//! User Model
//!
//! Registered user records and the validated registration payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, UserError};

/// Unique user identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Email address (unique across the store)
    pub email: String,

    /// Display name
    pub name: String,

    /// Age in years
    pub age: u32,

    /// Job designation
    pub designation: String,

    /// Salary (exact decimal)
    pub salary: Decimal,

    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// Registration payload, validated before storage
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub age: u32,
    pub designation: String,
    pub salary: Decimal,
}

impl NewUser {
    /// Validate field syntax. Email must look like `local@domain.tld`.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_email(&self.email) {
            return Err(UserError::InvalidEmail(self.email.clone()));
        }
        if self.name.trim().is_empty() {
            return Err(UserError::InvalidField("name must not be empty".into()));
        }
        Ok(())
    }

    /// Consume the payload into a stored `User` record
    pub fn into_user(self) -> User {
        User {
            id: UserId::new(),
            email: self.email,
            name: self.name,
            age: self.age,
            designation: self.designation,
            salary: self.salary,
            created_at: Utc::now(),
        }
    }
}

/// Minimal syntactic email check: non-empty local part, a single '@', and
/// a domain containing a dot
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            name: "Asha".into(),
            age: 30,
            designation: "Analyst".into(),
            salary: Decimal::new(7_500_000, 2),
        }
    }

    #[test]
    fn test_valid_email_accepted() {
        assert!(payload("asha@example.com").validate().is_ok());
    }

    #[test]
    fn test_invalid_emails_rejected() {
        for email in ["", "no-at-sign", "@example.com", "a@b", "a b@example.com", "a@@example.com"] {
            let err = payload(email).validate().unwrap_err();
            assert!(matches!(err, UserError::InvalidEmail(_)), "accepted {email:?}");
        }
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut user = payload("asha@example.com");
        user.name = "   ".into();
        assert!(matches!(user.validate().unwrap_err(), UserError::InvalidField(_)));
    }

    #[test]
    fn test_into_user_assigns_id_and_timestamp() {
        let user = payload("asha@example.com").into_user();
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(user.salary, Decimal::new(7_500_000, 2));
    }
}
