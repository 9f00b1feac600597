//! Error responses for the REST endpoints.

use axum::{http::StatusCode, response::IntoResponse, Json};

#[derive(Debug)]
pub enum ApiError {
    Database(jotter_core::Error),
    NotFound(String),
    BadRequest(String),
}

impl From<jotter_core::Error> for ApiError {
    fn from(err: jotter_core::Error) -> Self {
        match &err {
            jotter_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            jotter_core::Error::NoteNotFound(_) => ApiError::NotFound(err.public_message()),
            jotter_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            jotter_core::Error::Quota(violation) => ApiError::BadRequest(violation.message()),
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_status() {
        let cases = [
            (jotter_core::Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (jotter_core::Error::NoteNotFound(3), StatusCode::NOT_FOUND),
            (
                jotter_core::Error::InvalidInput("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                jotter_core::Error::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
