//! Register a new user.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{NewUser, User};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(required(message = "Missing 'first_name' field."))]
    pub first_name: Option<String>,
    #[validate(required(message = "Missing 'last_name' field."))]
    pub last_name: Option<String>,
    #[validate(
        required(message = "Missing 'email' field."),
        email(message = "Email must be formatted.")
    )]
    pub email: Option<String>,
    #[validate(required(message = "Missing 'phone' field."))]
    pub phone: Option<String>,
    #[validate(required(message = "Missing 'password' field."))]
    pub password: Option<String>,
}

/// Handler to register a user.
///
/// Both verification flags start false and a fresh passcode is stored, to be
/// proven back on `POST /otp/{id}`.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state
        .users
        .register(NewUser {
            first_name: body.first_name.unwrap_or_default(),
            last_name: body.last_name.unwrap_or_default(),
            email: body.email.unwrap_or_default(),
            phone: body.phone.unwrap_or_default(),
            password: body.password.unwrap_or_default(),
        })
        .await?;

    tracing::info!(user_id = user.id, "user registered");

    Ok((StatusCode::CREATED, Json(user)))
}
