//! Action envelope used by the web client.
//!
//! Requests are AJAX POSTs carrying
//!
//! ```json
//! {"action": "notes", "body": {"save": {"text": "..."}}}
//! ```
//!
//! `action` names a resource and the single key inside `body` names the
//! operation; its value holds the operation arguments. Every reply is HTTP
//! 200 with `{"errorCode": 0, "body": {...}}`, plus `errorMessage` when the
//! code is non-zero.

use axum::{
    http::{HeaderMap, Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use jotter_core::{Error, ErrorCode};

/// Header set by browsers' XHR wrappers; requests without it are rejected.
pub const AJAX_HEADER: &str = "x-requested-with";
pub const AJAX_HEADER_VALUE: &str = "XMLHttpRequest";

/// Authenticated user id, set by the upstream auth layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Resource named by the envelope's `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Notes,
    Quota,
}

/// Operation selected from the envelope's `body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetNote,
    SaveNote,
    DeleteNote,
    Attach,
    Detach,
    GetQuota,
}

impl Resource {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "notes" => Some(Self::Notes),
            "quota" => Some(Self::Quota),
            _ => None,
        }
    }

    /// Operation names accepted for this resource.
    pub fn operations(&self) -> &'static [(&'static str, Operation)] {
        match self {
            Self::Notes => &[
                ("get", Operation::GetNote),
                ("save", Operation::SaveNote),
                ("delete", Operation::DeleteNote),
                ("attach", Operation::Attach),
                ("detach", Operation::Detach),
            ],
            Self::Quota => &[("get", Operation::GetQuota)],
        }
    }
}

/// A decoded envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub resource: Resource,
    pub operation: Operation,
    pub args: Value,
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get(AJAX_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case(AJAX_HEADER_VALUE))
        .unwrap_or(false)
}

/// Validate and decode an envelope request.
pub fn parse_request(
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<ActionRequest, ErrorCode> {
    if method != Method::POST || !is_ajax(headers) || body.is_empty() {
        return Err(ErrorCode::INVALID_REQUEST_FORMAT);
    }

    let mut envelope = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => return Err(ErrorCode::INVALID_REQUEST_FORMAT),
    };

    let resource = envelope
        .get("action")
        .and_then(Value::as_str)
        .and_then(Resource::from_name)
        .ok_or(ErrorCode::INVALID_REQUEST_ACTION)?;

    let mut body = match envelope.remove("body") {
        Some(Value::Object(map)) if !map.is_empty() => map,
        _ => return Err(ErrorCode::INVALID_REQUEST_BODY),
    };

    let mut matching = resource
        .operations()
        .iter()
        .filter(|(name, _)| body.contains_key(*name));
    let (name, operation) = match (matching.next(), matching.next()) {
        (Some(found), None) => *found,
        _ => return Err(ErrorCode::INVALID_REQUEST_ACTION),
    };

    Ok(ActionRequest {
        resource,
        operation,
        args: body.remove(name).unwrap_or(Value::Null),
    })
}

/// Read the caller's user id. Missing or non-positive ids fail authentication.
pub fn user_id(headers: &HeaderMap) -> Result<i64, ErrorCode> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or(ErrorCode::AUTH_FAILED)
}

/// Envelope reply.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub error_code: ErrorCode,
    #[schema(value_type = Object)]
    pub body: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ActionResponse {
    /// Successful reply. Object results are merged into `body`; anything
    /// else is placed under `result`.
    pub fn success(result: Value) -> Self {
        let body = match result {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        Self {
            error_code: ErrorCode::NO_ERROR,
            body,
            error_message: None,
        }
    }

    /// Error reply with the code's default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::failure(code, code.message().to_string())
    }

    pub fn failure(code: ErrorCode, message: String) -> Self {
        Self {
            error_code: code,
            body: Map::new(),
            error_message: Some(message),
        }
    }

    /// Error reply for a failed operation. Infrastructure errors are logged
    /// and reported with a generic message.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Quota(_)
            | Error::NotFound(_)
            | Error::NoteNotFound(_)
            | Error::InvalidInput(_) => {}
            _ => tracing::error!(
                subsystem = "api",
                component = "envelope",
                error = %err,
                error_code = err.code().value(),
                "Action failed"
            ),
        }
        Self::failure(err.code(), err.public_message())
    }
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
