use serde::{Deserialize, Deserializer};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionPayload {
    #[validate(length(min = 1, message = "Session name cannot be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassPayload {
    #[validate(length(min = 1, message = "Class name cannot be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectPayload {
    #[validate(length(min = 1, message = "Subject name cannot be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentPayload {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Registration number cannot be empty"))]
    pub reg_no: String,
    #[validate(length(min = 1, message = "Class cannot be empty"))]
    pub class: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStudentPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub class: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeacherPayload {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignTeacherPayload {
    #[validate(length(min = 1, message = "Class cannot be empty"))]
    pub class: String,
    #[validate(length(min = 1, message = "Subject cannot be empty"))]
    pub subject: String,
}

// Trims strings and turns empty ones into None.
fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
