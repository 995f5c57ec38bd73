use crate::dto::test_dto::{CreateTestPayload, UpdateTestDurationPayload};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::routes::actor_from;
use crate::services::test_service::TestFilter;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

#[axum::debug_handler]
pub async fn create_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(payload): Json<CreateTestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let actor = actor_from(&claims, &headers);
    let test = state.test_service.create_test(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(test)))
}

#[axum::debug_handler]
pub async fn get_test_by_id(
    State(state): State<AppState>,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let test = state.test_service.get_test_by_id(test_id).await?;
    Ok(Json(test))
}

#[derive(Debug, serde::Deserialize, Default)]
#[serde(default)]
pub struct ListTestsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub class: Option<String>,
    pub subject: Option<String>,
    pub search: Option<String>,
}

#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
    Query(query): Query<ListTestsQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let filter = TestFilter {
        class: query.class,
        subject: query.subject,
        search: query.search,
    };

    let result = state
        .test_service
        .list_tests(page, per_page, Some(filter))
        .await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn update_test_duration(
    State(state): State<AppState>,
    Path(test_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(payload): Json<UpdateTestDurationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let actor = actor_from(&claims, &headers);
    let test = state
        .test_service
        .update_duration(test_id, payload.duration_minutes, &actor)
        .await?;
    Ok(Json(test))
}

#[axum::debug_handler]
pub async fn delete_test(
    State(state): State<AppState>,
    Path(test_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let actor = actor_from(&claims, &headers);
    let images = state.test_service.delete_test(test_id, &actor).await?;

    for path in images {
        state.upload_service.delete_image(&path).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
