use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Not Found")]
    NotFound,
    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl IntoResponse for CustomError {
    fn into_response(self) -> Response {
        let status_code = match self {
            CustomError::NotFound => StatusCode::NOT_FOUND,
            CustomError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        };
        (status_code, format!("{self}\n")).into_response()
    }
}
