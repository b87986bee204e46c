//! Student resource handlers: list, show, create, update, delete.

use crate::error::AppError;
use crate::state::AppState;
use crate::student::{NewStudent, PublicStudent, StudentPatch};
use crate::validation::{validate, FieldRule, CREATE_RULES, UPDATE_RULES};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    pub name: Option<String>,
    pub page: Option<u32>,
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid student id".into()))
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("Body must be a JSON object".into())),
    }
}

/// Run the rule table over the body, then deserialize into the typed shape.
/// Callers only see the fixed "Validation fails" message; the individual
/// violations go to the debug log.
fn checked<T: serde::de::DeserializeOwned>(
    body: Map<String, Value>,
    rules: &[(&'static str, FieldRule)],
) -> Result<T, AppError> {
    if let Err(violations) = validate(&body, rules) {
        tracing::debug!(?violations, "rejected payload");
        return Err(AppError::Validation("Validation fails".into()));
    }
    serde_json::from_value(Value::Object(body))
        .map_err(|_| AppError::Validation("Validation fails".into()))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    // An empty name parameter means no filter, as the original API behaved.
    let filter = query.name.as_deref().filter(|s| !s.is_empty());
    let page = query.page.unwrap_or(1);
    let result = match state.store.list(filter, page).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "list query failed");
            return Err(AppError::NotFound("Students not found".into()));
        }
    };
    Ok((StatusCode::OK, Json(result)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let student = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))?;
    Ok((StatusCode::OK, Json(student)))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let new: NewStudent = checked(body, CREATE_RULES)?;
    if state.store.find_by_email(&new.email).await?.is_some() {
        return Err(AppError::Conflict("Student already exists".into()));
    }
    let student = state.store.create(&new).await?;
    Ok((StatusCode::OK, Json(PublicStudent::from(student))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    let patch: StudentPatch = checked(body, UPDATE_RULES)?;

    // Confirm the record exists before anything touches its email.
    let existing = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))?;

    if let Some(email) = patch.email.as_deref() {
        if email != existing.email && state.store.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("E-mail already in use".into()));
        }
    }

    let student = state
        .store
        .update(id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))?;
    Ok((StatusCode::OK, Json(PublicStudent::from(student))))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id_str)?;
    if state.store.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("Student not found".into()));
    }
    state.store.delete(id).await?;
    Ok(StatusCode::OK)
}
