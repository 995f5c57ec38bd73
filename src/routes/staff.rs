use crate::dto::school_dto::{AssignTeacherPayload, CreateTeacherPayload};
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
pub async fn create_teacher(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(payload): Json<CreateTeacherPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let actor = actor_from(&claims, &headers);
    let teacher = state.staff_service.create_teacher(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

#[axum::debug_handler]
pub async fn list_teachers(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let teachers = state.staff_service.list_teachers().await?;
    Ok(Json(teachers))
}

#[axum::debug_handler]
pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let actor = actor_from(&claims, &headers);
    state.staff_service.delete_teacher(teacher_id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn assign_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(payload): Json<AssignTeacherPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let actor = actor_from(&claims, &headers);
    let assignment = state
        .staff_service
        .assign_teacher(teacher_id, payload, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[axum::debug_handler]
pub async fn list_assignments(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let assignments = state.staff_service.list_assignments(teacher_id).await?;
    Ok(Json(assignments))
}

#[axum::debug_handler]
pub async fn remove_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.staff_service.remove_assignment(assignment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
