use crate::dto::question_dto::{QuestionForm, UploadedFile};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::routes::actor_from;
use crate::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

/// Creates or updates a question on a test. The form arrives as
/// `multipart/form-data` so an image can ride along; a `question_id` field
/// switches the submission from create to edit.
#[axum::debug_handler]
pub async fn save_question(
    State(state): State<AppState>,
    Path(test_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = QuestionForm::default();
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "question_id" => {
                let raw = field.text().await.unwrap_or_default();
                if let Ok(id) = raw.trim().parse::<i64>() {
                    form.question_id = Some(id);
                }
            }
            "question_text" => form.question_text = field.text().await.unwrap_or_default(),
            "question_type" => form.question_type = field.text().await.unwrap_or_default(),
            "option1" => form.option1 = Some(field.text().await.unwrap_or_default()),
            "option2" => form.option2 = Some(field.text().await.unwrap_or_default()),
            "option3" => form.option3 = Some(field.text().await.unwrap_or_default()),
            "option4" => form.option4 = Some(field.text().await.unwrap_or_default()),
            "correct_answer" => form.correct_answer = Some(field.text().await.unwrap_or_default()),
            "correct_answers" => {
                form.correct_answers = Some(field.text().await.unwrap_or_default())
            }
            "remove_image" => {
                let raw = field.text().await.unwrap_or_default();
                form.remove_image = raw == "1" || raw.eq_ignore_ascii_case("true");
            }
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                if !filename.is_empty() && !data.is_empty() {
                    upload = Some(UploadedFile { filename, data });
                }
            }
            _ => {}
        }
    }

    let actor = actor_from(&claims, &headers);
    let saved = state
        .question_service
        .save_question(test_id, form, upload, &actor)
        .await?;

    Ok(Json(saved))
}

#[derive(Debug, serde::Deserialize, Default)]
#[serde(default)]
pub struct ListQuestionsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Path(test_id): Path<i64>,
    Query(query): Query<ListQuestionsQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let result = state
        .question_service
        .list_questions(test_id, page, per_page)
        .await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get_question(question_id).await?;
    Ok(Json(question))
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let actor = actor_from(&claims, &headers);
    state
        .question_service
        .delete_question(question_id, &actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
