use crate::dto::school_dto::{CreateClassPayload, CreateSessionPayload, CreateSubjectPayload};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::routes::actor_from;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let actor = actor_from(&claims, &headers);
    let session = state
        .academic_service
        .create_session(&payload.name, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[axum::debug_handler]
pub async fn list_sessions(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let sessions = state.academic_service.list_sessions().await?;
    Ok(Json(sessions))
}

#[axum::debug_handler]
pub async fn set_current_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let actor = actor_from(&claims, &headers);
    let session = state
        .academic_service
        .set_current_session(session_id, &actor)
        .await?;
    Ok(Json(session))
}

#[axum::debug_handler]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.academic_service.delete_session(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn create_class(
    State(state): State<AppState>,
    Json(payload): Json<CreateClassPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let class = state.academic_service.create_class(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[axum::debug_handler]
pub async fn list_classes(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let classes = state.academic_service.list_classes().await?;
    Ok(Json(classes))
}

#[axum::debug_handler]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.academic_service.delete_class(class_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn create_subject(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubjectPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let subject = state.academic_service.create_subject(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

#[axum::debug_handler]
pub async fn list_subjects(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let subjects = state.academic_service.list_subjects().await?;
    Ok(Json(subjects))
}

#[axum::debug_handler]
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(subject_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.academic_service.delete_subject(subject_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
