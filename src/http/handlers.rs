//! Verification endpoints.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::verification::{VerifiedRecord, NOT_VERIFIED};

/// First `value` pair of a query string. Later repeats are ignored.
fn first_value(pairs: Vec<(String, String)>) -> Option<String> {
    pairs
        .into_iter()
        .find_map(|(key, value)| (key == "value").then_some(value))
}

/// `GET /verify?value=...`
///
/// Answers with the stored record on a hit, or echoes the (escaped) input
/// with type "not verified" on a miss.
pub async fn lookup_verification(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<VerifiedRecord>, ApiError> {
    let value = match first_value(pairs) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("missing value".into())),
    };
    if value.len() > state.verification.max_input_length {
        return Err(ApiError::Validation("input too long".into()));
    }

    match state.store.lookup(&value) {
        Some(record) => Ok(Json(record)),
        None => Ok(Json(VerifiedRecord::new(escape_html(&value), NOT_VERIFIED))),
    }
}

/// `POST /verify` with a JSON `{value, type}` body.
pub async fn record_verification(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<VerifiedRecord>), ApiError> {
    let record: VerifiedRecord = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("invalid JSON: {}", e)))?;
    record
        .validate()
        .map_err(|msg| ApiError::Validation(msg.to_string()))?;

    state.store.add(record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Escape the characters that are special in HTML text and attributes.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
