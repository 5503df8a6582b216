//! Soft-delete a user; the record is retained in storage.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::error::Result;
use crate::{AppState, ServerError};

/// Handler to soft-delete a profile.
///
/// A second delete of the same id reports "no row affected" at the store
/// and surfaces as 404 here.
pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<StatusCode> {
    if state.users.soft_delete(user_id).await? {
        tracing::info!(user_id, "user soft-deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound)
    }
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    use crate::user::User;
    use crate::{app, make_request, router};

    #[sqlx::test]
    async fn test_delete_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let req_body = json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "phone": "+15550001",
            "password": "pw",
        });
        let response = make_request(
            app.clone(),
            Method::POST,
            "/user/register",
            req_body.to_string(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let user: User = serde_json::from_slice(&body).unwrap();

        let response = make_request(
            app.clone(),
            Method::DELETE,
            &format!("/user/{}", user.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Excluded from lookups afterwards.
        assert!(state.users.find_by_id(user.id).await.unwrap().is_none());
        assert!(
            state
                .users
                .find_by_email_or_phone("ada@example.com")
                .await
                .unwrap()
                .is_none()
        );

        // Second delete reports "no row affected".
        let response = make_request(
            app,
            Method::DELETE,
            &format!("/user/{}", user.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_deleted_email_can_register_again(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let req_body = json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "phone": "+15550001",
            "password": "pw",
        });
        let response = make_request(
            app.clone(),
            Method::POST,
            "/user/register",
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let user: User = serde_json::from_slice(&body).unwrap();

        let response = make_request(
            app.clone(),
            Method::DELETE,
            &format!("/user/{}", user.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Soft deletion releases the uniqueness claim.
        let response = make_request(
            app,
            Method::POST,
            "/user/register",
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
