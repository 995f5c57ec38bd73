use crate::dto::result_dto::{ExportResultsQuery, ListResultsQuery};
use crate::error::{Error, Result};
use crate::services::export_service::ExportService;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Query(query): Query<ListResultsQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let result = state
        .result_service
        .list_results(page, per_page, query.filter())
        .await?;
    Ok(Json(result))
}

/// Downloads the filtered results. `format=doc` (the default) serves an HTML
/// table with a Word content type; `format=xlsx` serves a spreadsheet.
#[axum::debug_handler]
pub async fn export_results(
    State(state): State<AppState>,
    Query(query): Query<ExportResultsQuery>,
) -> Result<impl IntoResponse> {
    let rows = state.result_service.fetch_all_results(query.filter()).await?;
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M");

    match query.format.as_deref().unwrap_or("doc") {
        "doc" => {
            let html = ExportService::generate_results_doc(&rows);
            let disposition = format!("attachment; filename=\"results_export_{}.doc\"", stamp);
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/msword".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                html.into_bytes(),
            ))
        }
        "xlsx" => {
            let buffer = ExportService::generate_results_xlsx(&rows)?;
            let disposition = format!("attachment; filename=\"results_export_{}.xlsx\"", stamp);
            Ok((
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                            .to_string(),
                    ),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                buffer,
            ))
        }
        other => Err(Error::Validation(format!(
            "Unknown export format: {}",
            other
        ))),
    }
}
