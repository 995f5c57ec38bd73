use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResult {
    pub id: i64,
    pub test_id: i64,
    pub student_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A result joined with its student and test metadata, as listed and exported.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResultRow {
    pub id: i64,
    pub student_name: String,
    pub reg_no: String,
    pub class: String,
    pub subject: String,
    pub test_title: String,
    pub score: i64,
    pub total_questions: i64,
    pub submitted_at: Option<DateTime<Utc>>,
}
