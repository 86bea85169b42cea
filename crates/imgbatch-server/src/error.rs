//! Server-level error type
//!
//! Feature routes map their own command/query errors; this type covers the
//! handlers that sit outside a feature slice.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::response::ErrorResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unavailable(ref message) => {
                tracing::warn!("Service unavailable: {}", message);
                ErrorResponse::new("SERVICE_UNAVAILABLE", message.clone())
                    .with_status(StatusCode::SERVICE_UNAVAILABLE)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_maps_to_503() {
        assert_eq!(
            AppError::Unavailable("db".into()).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
