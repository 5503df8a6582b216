use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::crypto::PasswordManager;
use crate::error::{Result, ServerError};
use crate::passcode::PasscodeIssuer;
use crate::user::{NewUser, User, UserPatch, UserRepository};

/// User manager: the credential store operations, above raw SQL.
#[derive(Clone)]
pub struct UserService {
    pub repo: UserRepository,
    pwd: Arc<PasswordManager>,
    passcode: PasscodeIssuer,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(
        pool: Pool<Postgres>,
        pwd: Arc<PasswordManager>,
        passcode: PasscodeIssuer,
    ) -> Self {
        Self {
            repo: UserRepository::new(pool),
            pwd,
            passcode,
        }
    }

    /// Register a new user.
    ///
    /// Fails with [`ServerError::Conflict`] when a non-deleted row already
    /// holds the candidate's email or phone. The password is hashed and a
    /// fresh passcode issued before insertion; both verification flags start
    /// false.
    pub async fn register(&self, candidate: NewUser) -> Result<User> {
        if self
            .repo
            .is_taken(&candidate.email, &candidate.phone)
            .await?
        {
            return Err(ServerError::Conflict);
        }

        let password = self.hash_password(candidate.password).await?;
        let otp = self.passcode.issue()?;

        self.repo
            .insert(&User {
                first_name: candidate.first_name,
                last_name: candidate.last_name,
                email: candidate.email,
                phone: candidate.phone,
                password,
                otp,
                ..Default::default()
            })
            .await
    }

    /// Find a non-deleted user by id.
    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        self.repo.find_by_id(user_id).await
    }

    /// Find a non-deleted user by email or phone.
    pub async fn find_by_email_or_phone(
        &self,
        key: &str,
    ) -> Result<Option<User>> {
        self.repo.find_by_email_or_phone(key).await
    }

    /// Full overwrite of all mutable fields.
    pub async fn replace(&self, user: &User) -> Result<User> {
        self.repo.replace(user).await
    }

    /// Overlay `patch` onto a freshly re-read record and write it back.
    ///
    /// Known lost-update hazard under concurrent modification: last write
    /// wins, there is no version token.
    pub async fn patch(&self, user_id: i32, patch: UserPatch) -> Result<User> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(ServerError::NotFound)?;

        self.repo.replace(&patch.apply(user)).await
    }

    /// Soft-delete a user; reports whether a row was affected.
    pub async fn soft_delete(&self, user_id: i32) -> Result<bool> {
        self.repo.soft_delete(user_id).await
    }

    /// Hash a password on the blocking pool.
    ///
    /// Argon2 is CPU-bound and intentionally slow; it must not stall the
    /// request executor.
    pub async fn hash_password(&self, password: String) -> Result<String> {
        let pwd = Arc::clone(&self.pwd);

        let hash = tokio::task::spawn_blocking(move || {
            pwd.hash_password(password)
        })
        .await
        .map_err(|err| ServerError::Internal {
            details: "password hashing task failed".into(),
            source: Some(Box::new(err)),
        })??;

        Ok(hash)
    }

    /// Verify a password against a stored PHC string, on the blocking pool.
    pub async fn verify_password(
        &self,
        password: String,
        phc_hash: String,
    ) -> Result<bool> {
        let pwd = Arc::clone(&self.pwd);

        let valid = tokio::task::spawn_blocking(move || {
            pwd.verify_password(password, &phc_hash)
        })
        .await
        .map_err(|err| ServerError::Internal {
            details: "password verification task failed".into(),
            source: Some(Box::new(err)),
        })??;

        Ok(valid)
    }
}
