use crate::dto::auth_dto::{CreateAdminPayload, LoginPayload, LoginResponse};
use crate::error::Result;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let (admin, token) = state.admin_service.login(payload).await?;

    Ok(Json(LoginResponse {
        token,
        name: admin.name,
        role: admin.role,
    }))
}

#[axum::debug_handler]
pub async fn create_admin(
    State(state): State<AppState>,
    Json(payload): Json<CreateAdminPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let admin = state.admin_service.create_admin(payload).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}
