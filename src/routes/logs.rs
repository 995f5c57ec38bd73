use crate::error::Result;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

#[derive(Debug, serde::Deserialize, Default)]
#[serde(default)]
pub struct ListLogsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[axum::debug_handler]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<ListLogsQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

    let logs = state.audit_service.list(page, per_page).await?;
    Ok(Json(logs))
}
