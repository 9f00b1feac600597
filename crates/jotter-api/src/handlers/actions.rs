//! Envelope endpoint for notes and quota actions.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::envelope::{self, ActionRequest, ActionResponse, Operation};
use crate::AppState;
use jotter_core::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteIdArgs {
    id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveNoteArgs {
    #[serde(default)]
    id: Option<i64>,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachArgs {
    note_id: i64,
    name: String,
    size: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetachArgs {
    note_id: i64,
    attachment_id: i64,
}

fn decode<T: DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| Error::InvalidInput(format!("Invalid arguments: {}", e)))
}

/// Run one envelope action.
///
/// POST /api/notes
#[utoipa::path(post, path = "/api/notes", tag = "Notes",
    params(
        ("X-Requested-With" = String, Header, description = "Must be XMLHttpRequest"),
        ("X-User-Id" = i64, Header, description = "Authenticated user id")
    ),
    responses((status = 200, description = "Envelope reply; failures are reported in errorCode", body = ActionResponse)))]
pub async fn handle_action(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ActionResponse {
    let request = match envelope::parse_request(&method, &headers, &body) {
        Ok(request) => request,
        Err(code) => {
            debug!(
                subsystem = "api",
                component = "envelope",
                error_code = code.value(),
                "Rejected envelope"
            );
            return ActionResponse::from_code(code);
        }
    };
    let user_id = match envelope::user_id(&headers) {
        Ok(id) => id,
        Err(code) => return ActionResponse::from_code(code),
    };

    match dispatch(&state, user_id, request).await {
        Ok(body) => ActionResponse::success(body),
        Err(err) => ActionResponse::from_error(&err),
    }
}

async fn dispatch(state: &AppState, user_id: i64, request: ActionRequest) -> Result<Value> {
    let notes = &state.notes;
    debug!(
        subsystem = "api",
        component = "envelope",
        action = ?request.operation,
        user_id,
        "Dispatching action"
    );

    match request.operation {
        Operation::GetNote => {
            let args: NoteIdArgs = decode(request.args)?;
            let note = notes.get(user_id, args.id).await?;
            Ok(json!({ "note": note }))
        }
        Operation::SaveNote => {
            let args: SaveNoteArgs = decode(request.args)?;
            let saved = notes.save(user_id, args.id, &args.text).await?;
            Ok(json!({ "note": saved.value, "usage": saved.usage }))
        }
        Operation::DeleteNote => {
            let args: NoteIdArgs = decode(request.args)?;
            notes.delete(user_id, args.id).await?;
            Ok(json!({ "deleted": args.id }))
        }
        Operation::Attach => {
            let args: AttachArgs = decode(request.args)?;
            let saved = notes
                .attach(user_id, args.note_id, &args.name, args.size)
                .await?;
            Ok(json!({ "attachment": saved.value, "usage": saved.usage }))
        }
        Operation::Detach => {
            let args: DetachArgs = decode(request.args)?;
            notes
                .detach(user_id, args.note_id, args.attachment_id)
                .await?;
            Ok(json!({ "detached": args.attachment_id }))
        }
        Operation::GetQuota => {
            let quota = notes.quota_snapshot(user_id).await?;
            Ok(json!({ "quota": quota }))
        }
    }
}
