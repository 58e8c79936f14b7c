//! Error handler for the HTTP layer.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::ProfileError;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseError {
    pub r#type: Option<String>,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: Option<String>,
    pub errors: Option<Vec<FieldError>>,
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

    /// Point the error at an input field.
    pub fn field(mut self, field: &str, message: &str) -> Self {
        self.errors.get_or_insert_with(Vec::new).push(FieldError {
            field: field.into(),
            message: message.into(),
        });
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
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were validation errors with your request.")
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Profile(ProfileError::Validation(err)) => {
                response.field(err.field(), &err.to_string())
            },

            ServerError::Profile(ProfileError::Conflict(_)) => response
                .title("Request conflicts with an existing resource.")
                .status(StatusCode::CONFLICT),

            ServerError::Profile(ProfileError::NotFound(_)) => response
                .title("Resource not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::Profile(ProfileError::Storage(source)) => {
                tracing::error!(error = %source, "server returned 500 status");

                ResponseError::default()
            },

            ServerError::Json(rejection) => response
                .title("Request body could not be parsed.")
                .details(&rejection.body_text())
                .status(rejection.status()),

            ServerError::Path(rejection) => response
                .title("Invalid path parameter.")
                .details(&rejection.body_text())
                .status(rejection.status()),
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
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
