//! HTTP routes.

pub mod login;
pub mod register;
pub mod status;
pub mod users;
pub mod verify;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::ServerError;

/// JSON body extractor that runs `validator` checks before the handler.
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Build an [`crate::AppState`] over a test pool.
#[cfg(test)]
pub(crate) fn state(pool: sqlx::Pool<sqlx::Postgres>) -> crate::AppState {
    use std::sync::Arc;

    // Cheap argon2 parameters, tests only.
    let pwd = Arc::new(
        crate::crypto::PasswordManager::new(Some(crate::config::Argon2 {
            memory_cost: 4096,
            iterations: 1,
            parallelism: 1,
            hash_length: 32,
        }))
        .expect("invalid argon2 parameters"),
    );

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        db: crate::database::Database {
            postgres: pool.clone(),
        },
        users: crate::user::UserService::new(
            pool,
            pwd,
            crate::passcode::PasscodeIssuer::default(),
        ),
        token: crate::token::TokenManager::new("test-secret", ""),
    }
}
