//! Get a user's own record.

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::error::Result;
use crate::user::User;

/// Handler to read a profile.
///
/// Not-found is not distinguished: the body is simply `null`.
pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Option<User>>> {
    Ok(Json(state.users.find_by_id(user_id).await?))
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
    async fn test_get_user_handler(pool: Pool<Postgres>) {
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
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let created: User = serde_json::from_slice(&body).unwrap();

        let response = make_request(
            app,
            Method::GET,
            &format!("/user/{}", created.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let user: User = serde_json::from_slice(&body).unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(user.email, "ada@example.com");
    }

    #[sqlx::test]
    async fn test_get_unknown_user_is_null(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/user/4242",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(body.is_null());
    }
}
