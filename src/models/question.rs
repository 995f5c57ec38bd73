use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::FillBlank => "fill_blank",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "single_choice" => Some(QuestionType::SingleChoice),
            "multiple_choice" => Some(QuestionType::MultipleChoice),
            "true_false" => Some(QuestionType::TrueFalse),
            "fill_blank" => Some(QuestionType::FillBlank),
            _ => None,
        }
    }

    /// Only choice questions carry an attached image.
    pub fn supports_image(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice | QuestionType::MultipleChoice
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub test_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub class: String,
    pub subject: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// One answer-variant row, in the table matching the question's type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerDetails {
    SingleChoice(SingleChoiceAnswer),
    MultipleChoice(MultipleChoiceAnswer),
    TrueFalse(TrueFalseAnswer),
    FillBlank(FillBlankAnswer),
}

impl AnswerDetails {
    pub fn question_type(&self) -> QuestionType {
        match self {
            AnswerDetails::SingleChoice(_) => QuestionType::SingleChoice,
            AnswerDetails::MultipleChoice(_) => QuestionType::MultipleChoice,
            AnswerDetails::TrueFalse(_) => QuestionType::TrueFalse,
            AnswerDetails::FillBlank(_) => QuestionType::FillBlank,
        }
    }

    pub fn image_path(&self) -> Option<&str> {
        match self {
            AnswerDetails::SingleChoice(a) => a.image_path.as_deref(),
            AnswerDetails::MultipleChoice(a) => a.image_path.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SingleChoiceAnswer {
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub correct_answer: String,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MultipleChoiceAnswer {
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub correct_answers: String,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrueFalseAnswer {
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FillBlankAnswer {
    pub correct_answer: String,
}
