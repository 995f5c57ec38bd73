use crate::models::question::{AnswerDetails, Question};
use bytes::Bytes;
use serde::Serialize;

/// The submitted question form, as assembled from the multipart fields.
/// Type-specific fields stay optional here; the transaction manager decides
/// which ones a given question type requires.
#[derive(Debug, Clone, Default)]
pub struct QuestionForm {
    pub question_id: Option<i64>,
    pub question_text: String,
    pub question_type: String,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub option4: Option<String>,
    /// single_choice: correct option index "1".."4"; true_false: "True"/"False";
    /// fill_blank: the expected answer text.
    pub correct_answer: Option<String>,
    /// multiple_choice: comma-separated option indices, e.g. "1,3".
    pub correct_answers: Option<String>,
    pub remove_image: bool,
}

/// An image file received alongside the form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Added,
    Updated,
}

#[derive(Debug, Serialize)]
pub struct SavedQuestion {
    pub id: i64,
    pub status: SaveStatus,
}

#[derive(Debug, Serialize)]
pub struct QuestionWithAnswers {
    #[serde(flatten)]
    pub question: Question,
    pub answers: AnswerDetails,
}
