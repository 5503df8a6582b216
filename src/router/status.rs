//! Public server status.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;
use crate::error::Result;

/// Structured status.
#[derive(Serialize)]
pub struct Status {
    name: String,
    version: String,
}

/// Public server status; round-trips the connection pool.
pub async fn handler(State(state): State<AppState>) -> Result<Json<Status>> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db.postgres)
        .await?;

    Ok(Json(Status {
        name: if state.config.name.is_empty() {
            env!("CARGO_CRATE_NAME").into()
        } else {
            state.config.name.clone()
        },
        version: env!("CARGO_PKG_VERSION").into(),
    }))
}
