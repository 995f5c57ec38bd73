use crate::dto::school_dto::{CreateStudentPayload, UpdateStudentPayload};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::routes::actor_from;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

#[axum::debug_handler]
pub async fn create_student(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(payload): Json<CreateStudentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let actor = actor_from(&claims, &headers);
    let student = state.student_service.create_student(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[derive(Debug, serde::Deserialize, Default)]
#[serde(default)]
pub struct ListStudentsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub class: Option<String>,
    pub search: Option<String>,
}

#[axum::debug_handler]
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListStudentsQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let result = state
        .student_service
        .list_students(page, per_page, query.class, query.search)
        .await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn update_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Json(payload): Json<UpdateStudentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let student = state
        .student_service
        .update_student(student_id, payload)
        .await?;
    Ok(Json(student))
}

#[axum::debug_handler]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let actor = actor_from(&claims, &headers);
    state
        .student_service
        .delete_student(student_id, &actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
