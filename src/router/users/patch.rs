//! Partial profile update.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{User, UserPatch};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Email must be formatted."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub email_verified: Option<bool>,
    pub phone_verified: Option<bool>,
    pub otp: Option<String>,
}

/// Handler to overlay supplied fields onto a profile.
///
/// The merge happens against a freshly re-read record inside the store;
/// concurrent patches interleave with last-write-wins semantics.
pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Valid(body): Valid<Body>,
) -> Result<Json<User>> {
    let merged = state
        .users
        .patch(
            user_id,
            UserPatch {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                phone: body.phone,
                email_verified: body.email_verified,
                phone_verified: body.phone_verified,
                otp: body.otp,
            },
        )
        .await?;

    Ok(Json(merged))
}
