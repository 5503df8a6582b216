//! Handle database requests.

use sqlx::{Pool, Postgres};

use crate::error::{Result, ServerError};
use crate::user::User;

const COLUMNS: &str = "id, first_name, last_name, email, phone, password, \
     email_verified, phone_verified, otp, is_deleted, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Whether a non-deleted row already holds this email or phone.
    pub async fn is_taken(&self, email: &str, phone: &str) -> Result<bool> {
        let row: Option<i32> = sqlx::query_scalar(
            r#"SELECT id FROM users
                WHERE (email = $1 OR phone = $2) AND is_deleted IS FALSE
                LIMIT 1"#,
        )
        .bind(email)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Insert a new row and return it as stored.
    ///
    /// `password` must already be hashed and `otp` freshly issued.
    pub async fn insert(&self, user: &User) -> Result<User> {
        let query = format!(
            r#"INSERT INTO users
                (first_name, last_name, email, phone, password,
                 email_verified, phone_verified, otp)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {COLUMNS}"#
        );

        let stored = sqlx::query_as::<_, User>(&query)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.password)
            .bind(user.email_verified)
            .bind(user.phone_verified)
            .bind(&user.otp)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    /// Find a non-deleted user using `id` field.
    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        let query = format!(
            r#"SELECT {COLUMNS} FROM users
                WHERE id = $1 AND is_deleted IS FALSE"#
        );

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Find a non-deleted user whose email or phone equals `key`.
    pub async fn find_by_email_or_phone(
        &self,
        key: &str,
    ) -> Result<Option<User>> {
        let query = format!(
            r#"SELECT {COLUMNS} FROM users
                WHERE (email = $1 OR phone = $1) AND is_deleted IS FALSE"#
        );

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Full overwrite of all mutable fields by id.
    pub async fn replace(&self, user: &User) -> Result<User> {
        let query = format!(
            r#"UPDATE users
                SET first_name = $2, last_name = $3, email = $4, phone = $5,
                    email_verified = $6, phone_verified = $7, otp = $8,
                    updated_at = NOW()
                WHERE id = $1 AND is_deleted IS FALSE
                RETURNING {COLUMNS}"#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(user.email_verified)
            .bind(user.phone_verified)
            .bind(&user.otp)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServerError::NotFound)
    }

    /// Mark a non-deleted row as deleted; the record is retained.
    ///
    /// Returns whether a row was affected: deleting an already-deleted id
    /// reports `false`, not an error.
    pub async fn soft_delete(&self, user_id: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE users SET is_deleted = TRUE, updated_at = NOW()
                WHERE id = $1 AND is_deleted IS FALSE"#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
