mod repository;
mod service;

pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};

/// User as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip)]
    pub password: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub otp: String,
    pub is_deleted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Registration candidate, before hashing and passcode issuance.
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Partial overlay for a [`User`].
///
/// Absent fields are left untouched; the merge is always computed against a
/// freshly re-read record, never a caller-held copy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub email_verified: Option<bool>,
    pub phone_verified: Option<bool>,
    pub otp: Option<String>,
}

impl UserPatch {
    /// Overlay present fields onto `user`.
    pub fn apply(self, mut user: User) -> User {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(email_verified) = self.email_verified {
            user.email_verified = email_verified;
        }
        if let Some(phone_verified) = self.phone_verified {
            user.phone_verified = phone_verified;
        }
        if let Some(otp) = self.otp {
            user.otp = otp;
        }
        user
    }
}
