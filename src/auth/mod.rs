//! Sign-in capability for clinical staff.
//!
//! Only a fixed demo directory ships today; the trait is the seam for a real
//! identity provider.

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Physician,
    Nurse,
    Technician,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Physician => "physician",
            Role::Nurse => "nurse",
            Role::Technician => "technician",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed-in staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication provider unavailable: {0}")]
    Unavailable(String),
}

pub trait AuthClient: Send + Sync {
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;
}

struct DirectoryEntry {
    id: &'static str,
    email: &'static str,
    name: &'static str,
    role: Role,
    department: &'static str,
}

const DEMO_PASSWORD: &str = "demo123";

const DEMO_DIRECTORY: [DirectoryEntry; 2] = [
    DirectoryEntry {
        id: "1",
        email: "dr.smith@hospital.com",
        name: "Dr. Sarah Smith",
        role: Role::Physician,
        department: "Oncology",
    },
    DirectoryEntry {
        id: "2",
        email: "nurse.johnson@hospital.com",
        name: "Jennifer Johnson",
        role: Role::Nurse,
        department: "Oncology",
    },
];

/// Demo directory with a shared password; emails match case-insensitively.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAuthClient;

impl MockAuthClient {
    pub fn authenticate_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let email = email.trim();
        let entry = DEMO_DIRECTORY
            .iter()
            .find(|entry| entry.email.eq_ignore_ascii_case(email))
            .filter(|_| password == DEMO_PASSWORD)
            .ok_or(AuthError::InvalidCredentials)?;

        info!(user_id = entry.id, role = %entry.role, "staff sign-in");

        Ok(User {
            id: entry.id.to_string(),
            email: entry.email.to_string(),
            name: entry.name.to_string(),
            role: entry.role,
            department: entry.department.to_string(),
            last_login: Some(now),
        })
    }
}

impl AuthClient for MockAuthClient {
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.authenticate_at(email, password, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn demo_physician_signs_in() {
        let user = MockAuthClient
            .authenticate("dr.smith@hospital.com", "demo123")
            .await
            .expect("valid credentials");

        assert_eq!(user.id, "1");
        assert_eq!(user.name, "Dr. Sarah Smith");
        assert_eq!(user.role, Role::Physician);
        assert_eq!(user.department, "Oncology");
        assert!(user.last_login.is_some());
    }

    #[test]
    fn email_match_ignores_case_and_stamps_login() {
        let now = Utc
            .with_ymd_and_hms(2024, 1, 15, 8, 0, 0)
            .single()
            .expect("valid timestamp");

        let user = MockAuthClient
            .authenticate_at(" Nurse.Johnson@Hospital.com ", "demo123", now)
            .expect("valid credentials");

        assert_eq!(user.email, "nurse.johnson@hospital.com");
        assert_eq!(user.role, Role::Nurse);
        assert_eq!(user.last_login, Some(now));
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_email_is_rejected() {
        assert_eq!(
            MockAuthClient
                .authenticate("dr.smith@hospital.com", "Demo123")
                .await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            MockAuthClient
                .authenticate("admin@hospital.com", "demo123")
                .await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_value(Role::Technician).expect("serialize role");
        assert_eq!(json, "technician");
    }
}
