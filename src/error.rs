//! Error handler for accountd.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::{Error as SQLxError, postgres::PgDatabaseError};
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),

    #[error("email or phone number already exists")]
    Conflict,

    #[error("user not found")]
    NotFound,

    #[error("invalid email or phone number")]
    UnknownIdentity,

    #[error("email or phone number is not verified")]
    Unverified,

    #[error("invalid password")]
    InvalidCredentials,

    #[error("invalid OTP")]
    InvalidCode,

    #[error("invalid email or phone number")]
    Mismatch,

    #[error(transparent)]
    Passcode(#[from] crate::passcode::PasscodeError),

    #[error(transparent)]
    Hash(#[from] crate::crypto::CryptoError),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("internal server error, {details}")]
    Internal {
        details: String,
        source: Option<Box<dyn std::error::Error>>,
    },
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    title: String,
    status: u16,
    detail: String,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were errors with your request.")
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            // The registration boundary collapses bad input and duplicates
            // into a generic server error; kept as documented behavior.
            ServerError::Validation(_) | ServerError::Conflict => {
                response.status(StatusCode::INTERNAL_SERVER_ERROR)
            },

            ServerError::NotFound => response.status(StatusCode::NOT_FOUND),

            ServerError::UnknownIdentity
            | ServerError::Unverified
            | ServerError::InvalidCredentials
            | ServerError::InvalidCode
            | ServerError::Mismatch
            | ServerError::Axum(_) => response,

            ServerError::Sql(err) => response
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .details(
                    err.as_database_error()
                        .and_then(|e| {
                            e.downcast_ref::<PgDatabaseError>().detail()
                        })
                        .unwrap_or(&err.to_string()),
                ),

            ServerError::Internal { details, source } => {
                tracing::error!(
                    err = ?source,
                    %details,
                    "server returned 500 status"
                );

                ResponseError::default()
            },

            _ => response.status(StatusCode::INTERNAL_SERVER_ERROR),
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
