//! Airport and city lookup handlers.
//!
//! - `GET /place/{kind}?q=...&limit=...` search by code or name prefix
//! - `GET /place/{kind}/{code}` single place
//! - `PUT /place/{kind}/{code}` create or replace
//! - `DELETE /place/{kind}/{code}` remove

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

use crate::{ApiError, AppState};
use jotter_core::{defaults, normalize_place_code, Place, PlaceKind, PlaceQuery, UpsertPlaceRequest};

/// Search parameters. `limit` is read as text so a bad value gets a JSON 400.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlaceSearchParams {
    /// Code or name prefix, at least two characters.
    pub q: Option<String>,
    /// Max results (default 10, capped at 100).
    pub limit: Option<String>,
}

fn parse_kind(kind: &str) -> Result<PlaceKind, ApiError> {
    Ok(kind.parse::<PlaceKind>()?)
}

fn parse_code(code: &str) -> Result<String, ApiError> {
    normalize_place_code(code).map_err(ApiError::BadRequest)
}

/// Validate search parameters into a repository query.
pub fn build_query(kind: PlaceKind, params: &PlaceSearchParams) -> Result<PlaceQuery, ApiError> {
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();
    if term.chars().count() < defaults::PLACE_QUERY_MIN_LEN {
        return Err(ApiError::BadRequest(format!(
            "Parameter 'q' is required and must contain at least {} characters",
            defaults::PLACE_QUERY_MIN_LEN
        )));
    }

    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => defaults::PLACE_LIMIT,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n > 0 => n.min(defaults::PLACE_LIMIT_MAX),
            _ => {
                return Err(ApiError::BadRequest(format!(
                    "Parameter 'limit' must be a positive integer, got '{}'",
                    raw
                )))
            }
        },
    };

    Ok(PlaceQuery {
        kind,
        term: term.to_string(),
        limit,
    })
}

/// Search places by code or name prefix.
///
/// GET /place/{kind}
#[utoipa::path(get, path = "/place/{kind}", tag = "Places",
    params(("kind" = String, Path, description = "airport or city"), PlaceSearchParams),
    responses(
        (status = 200, description = "Matching places, exact code first", body = Vec<Place>),
        (status = 400, description = "Missing or invalid parameters"),
        (status = 404, description = "Nothing found or unknown kind")
    ))]
pub async fn search_places(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<PlaceSearchParams>,
) -> Result<Json<Vec<Place>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let query = build_query(kind, &params)?;

    let places = state.places.search(&query).await?;
    debug!(
        subsystem = "api",
        component = "places",
        op = "search",
        place_kind = %kind,
        result_count = places.len(),
        "Place search"
    );

    if places.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No {} matches '{}'",
            kind, query.term
        )));
    }
    Ok(Json(places))
}

/// Get a place by code.
///
/// GET /place/{kind}/{code}
#[utoipa::path(get, path = "/place/{kind}/{code}", tag = "Places",
    params(("kind" = String, Path,), ("code" = String, Path, description = "IATA code")),
    responses(
        (status = 200, description = "Found", body = Place),
        (status = 400, description = "Invalid code"),
        (status = 404, description = "Not found")
    ))]
pub async fn get_place(
    State(state): State<AppState>,
    Path((kind, code)): Path<(String, String)>,
) -> Result<Json<Place>, ApiError> {
    let kind = parse_kind(&kind)?;
    let code = parse_code(&code)?;
    state
        .places
        .get(kind, &code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", kind, code)))
}

/// Create or replace a place.
///
/// PUT /place/{kind}/{code}
#[utoipa::path(put, path = "/place/{kind}/{code}", tag = "Places",
    params(("kind" = String, Path,), ("code" = String, Path, description = "IATA code")),
    request_body = UpsertPlaceRequest,
    responses(
        (status = 201, description = "Created", body = Place),
        (status = 200, description = "Updated", body = Place),
        (status = 400, description = "Invalid name or codes")
    ))]
pub async fn upsert_place(
    State(state): State<AppState>,
    Path((kind, code)): Path<(String, String)>,
    payload: Result<Json<UpsertPlaceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Place>), ApiError> {
    let kind = parse_kind(&kind)?;
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let place = req.into_place(kind, &code)?;
    let created = state.places.upsert(&place).await?;
    debug!(
        subsystem = "api",
        component = "places",
        op = "upsert",
        place_kind = %kind,
        created,
        "Place stored"
    );
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(place)))
}

/// Delete a place.
///
/// DELETE /place/{kind}/{code}
#[utoipa::path(delete, path = "/place/{kind}/{code}", tag = "Places",
    params(("kind" = String, Path,), ("code" = String, Path, description = "IATA code")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    ))]
pub async fn delete_place(
    State(state): State<AppState>,
    Path((kind, code)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_kind(&kind)?;
    let code = parse_code(&code)?;
    if state.places.delete(kind, &code).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("{} {} not found", kind, code)))
    }
}
