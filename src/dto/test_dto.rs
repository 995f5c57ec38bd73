use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTestPayload {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Class cannot be empty"))]
    pub class: String,
    #[validate(length(min = 1, message = "Subject cannot be empty"))]
    pub subject: String,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTestDurationPayload {
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: i64,
}
