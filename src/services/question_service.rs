use crate::dto::question_dto::{
    QuestionForm, QuestionWithAnswers, SaveStatus, SavedQuestion, UploadedFile,
};
use crate::error::{Error, Result};
use crate::models::question::{
    AnswerDetails, FillBlankAnswer, MultipleChoiceAnswer, Question, QuestionType,
    SingleChoiceAnswer, TrueFalseAnswer,
};
use crate::models::test::Test;
use crate::services::audit_service::{Actor, AuditService};
use crate::services::upload_service::UploadService;
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Debug, serde::Serialize)]
pub struct PaginatedQuestions {
    pub items: Vec<QuestionWithAnswers>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// The answer payload as parsed out of a submitted form, one variant per
/// question type. Persisting a question means inserting exactly one of these
/// into the matching table.
#[derive(Debug, Clone)]
enum ParsedAnswers {
    SingleChoice {
        options: [String; 4],
        correct_answer: String,
    },
    MultipleChoice {
        options: [String; 4],
        correct_answers: String,
    },
    TrueFalse {
        correct_answer: String,
    },
    FillBlank {
        correct_answer: String,
    },
}

#[derive(Clone)]
pub struct QuestionService {
    pool: SqlitePool,
    audit: AuditService,
    uploads: UploadService,
}

impl QuestionService {
    pub fn new(pool: SqlitePool, uploads: UploadService) -> Self {
        let audit = AuditService::new(pool.clone());
        Self {
            pool,
            audit,
            uploads,
        }
    }

    /// Persists a submitted question so its header row and single
    /// answer-variant row stay mutually consistent, or persists nothing.
    pub async fn save_question(
        &self,
        test_id: i64,
        form: QuestionForm,
        upload: Option<UploadedFile>,
        actor: &Actor,
    ) -> Result<SavedQuestion> {
        let question_text = form.question_text.trim().to_string();
        if question_text.is_empty() {
            return Err(Error::Validation("Question text cannot be empty".into()));
        }
        let question_type = QuestionType::parse(&form.question_type).ok_or_else(|| {
            Error::Validation(format!("Unknown question type: {}", form.question_type))
        })?;

        if !question_type.supports_image() && (upload.is_some() || form.remove_image) {
            return Err(Error::Validation(
                "Images are only supported for choice questions".into(),
            ));
        }

        let answers = parse_answers(question_type, &form)?;

        let test = sqlx::query_as::<_, Test>(
            "SELECT id, title, class, subject, duration_minutes, created_at FROM tests WHERE id = ?1",
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Test no longer exists".to_string()))?;

        // The upload runs before the transaction opens; a failed upload aborts
        // with nothing written to the database.
        let uploaded_path = match &upload {
            Some(file) => Some(
                self.uploads
                    .store_question_image(form.question_id, &file.filename, &file.data)
                    .await?,
            ),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let (question_id, status) = match form.question_id {
            Some(id) => {
                let updated = sqlx::query(
                    "UPDATE questions SET question_text = ?1, question_type = ?2 WHERE id = ?3 AND test_id = ?4",
                )
                .bind(&question_text)
                .bind(question_type)
                .bind(id)
                .bind(test.id)
                .execute(&mut *tx)
                .await?;
                if updated.rows_affected() == 0 {
                    return Err(Error::NotFound("Question no longer exists".to_string()));
                }
                (id, SaveStatus::Updated)
            }
            None => {
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO questions (test_id, question_text, question_type, class, subject, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(test.id)
                .bind(&question_text)
                .bind(question_type)
                .bind(&test.class)
                .bind(&test.subject)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
                (inserted.last_insert_rowid(), SaveStatus::Added)
            }
        };

        // Any image already attached to this question, so a Keep edit can carry
        // it across the variant rewrite.
        let previous_image = existing_image_path(&mut tx, question_id).await?;

        // Replacing the variant row also covers type changes; wiping all four
        // tables is what keeps the one-variant-row invariant from leaving an
        // orphan behind in the old type's table.
        sqlx::query("DELETE FROM single_choice_answers WHERE question_id = ?1")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM multiple_choice_answers WHERE question_id = ?1")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM true_false_answers WHERE question_id = ?1")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM fill_blank_answers WHERE question_id = ?1")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;

        let image_path = if uploaded_path.is_some() {
            uploaded_path.clone()
        } else if form.remove_image {
            None
        } else {
            previous_image.clone()
        };

        match &answers {
            ParsedAnswers::SingleChoice {
                options,
                correct_answer,
            } => {
                sqlx::query(
                    r#"
                    INSERT INTO single_choice_answers (question_id, option1, option2, option3, option4, correct_answer, image_path)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                )
                .bind(question_id)
                .bind(&options[0])
                .bind(&options[1])
                .bind(&options[2])
                .bind(&options[3])
                .bind(correct_answer)
                .bind(&image_path)
                .execute(&mut *tx)
                .await?;
            }
            ParsedAnswers::MultipleChoice {
                options,
                correct_answers,
            } => {
                sqlx::query(
                    r#"
                    INSERT INTO multiple_choice_answers (question_id, option1, option2, option3, option4, correct_answers, image_path)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                )
                .bind(question_id)
                .bind(&options[0])
                .bind(&options[1])
                .bind(&options[2])
                .bind(&options[3])
                .bind(correct_answers)
                .bind(&image_path)
                .execute(&mut *tx)
                .await?;
            }
            ParsedAnswers::TrueFalse { correct_answer } => {
                sqlx::query(
                    "INSERT INTO true_false_answers (question_id, correct_answer) VALUES (?1, ?2)",
                )
                .bind(question_id)
                .bind(correct_answer)
                .execute(&mut *tx)
                .await?;
            }
            ParsedAnswers::FillBlank { correct_answer } => {
                sqlx::query(
                    "INSERT INTO fill_blank_answers (question_id, correct_answer) VALUES (?1, ?2)",
                )
                .bind(question_id)
                .bind(correct_answer)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        // The old file is only stale once the new row is committed.
        if let Some(prev) = &previous_image {
            if image_path.as_deref() != Some(prev.as_str()) {
                self.uploads.delete_image(prev).await;
            }
        }

        let verb = match status {
            SaveStatus::Added => "Added",
            SaveStatus::Updated => "Updated",
        };
        let activity = format!("{} question: {}", verb, truncate(&question_text, 50));
        self.audit.log_best_effort(actor, &activity).await;

        Ok(SavedQuestion {
            id: question_id,
            status,
        })
    }

    pub async fn get_question(&self, question_id: i64) -> Result<QuestionWithAnswers> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, test_id, question_text, question_type, class, subject, created_at
            FROM questions WHERE id = ?1
            "#,
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

        let answers = self.fetch_answers(question.id, question.question_type).await?;
        Ok(QuestionWithAnswers { question, answers })
    }

    pub async fn list_questions(
        &self,
        test_id: i64,
        page: i64,
        per_page: i64,
    ) -> Result<PaginatedQuestions> {
        let offset = (page - 1) * per_page;

        let test_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tests WHERE id = ?1")
            .bind(test_id)
            .fetch_one(&self.pool)
            .await?;
        if test_exists == 0 {
            return Err(Error::NotFound("Test no longer exists".to_string()));
        }

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE test_id = ?1")
            .bind(test_id)
            .fetch_one(&self.pool)
            .await?;

        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, test_id, question_text, question_type, class, subject, created_at
            FROM questions
            WHERE test_id = ?1
            ORDER BY id
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(test_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(questions.len());
        for question in questions {
            let answers = self.fetch_answers(question.id, question.question_type).await?;
            items.push(QuestionWithAnswers { question, answers });
        }

        let total_pages = if per_page > 0 {
            ((total as f64) / (per_page as f64)).ceil() as i64
        } else {
            1
        };

        Ok(PaginatedQuestions {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Removes a question, its answer-variant row (via the schema cascade) and
    /// its attached image, if any. The file deletion is best-effort and happens
    /// only after the database delete has committed.
    pub async fn delete_question(&self, question_id: i64, actor: &Actor) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, test_id, question_text, question_type, class, subject, created_at
            FROM questions WHERE id = ?1
            "#,
        )
        .bind(question_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

        let image = existing_image_path(&mut tx, question_id).await?;

        sqlx::query("DELETE FROM questions WHERE id = ?1")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if let Some(path) = image {
            self.uploads.delete_image(&path).await;
        }

        let activity = format!(
            "Deleted question: {}",
            truncate(&question.question_text, 50)
        );
        self.audit.log_best_effort(actor, &activity).await;

        Ok(())
    }

    async fn fetch_answers(
        &self,
        question_id: i64,
        question_type: QuestionType,
    ) -> Result<AnswerDetails> {
        let details = match question_type {
            QuestionType::SingleChoice => AnswerDetails::SingleChoice(
                sqlx::query_as::<_, SingleChoiceAnswer>(
                    r#"
                    SELECT option1, option2, option3, option4, correct_answer, image_path
                    FROM single_choice_answers WHERE question_id = ?1
                    "#,
                )
                .bind(question_id)
                .fetch_one(&self.pool)
                .await?,
            ),
            QuestionType::MultipleChoice => AnswerDetails::MultipleChoice(
                sqlx::query_as::<_, MultipleChoiceAnswer>(
                    r#"
                    SELECT option1, option2, option3, option4, correct_answers, image_path
                    FROM multiple_choice_answers WHERE question_id = ?1
                    "#,
                )
                .bind(question_id)
                .fetch_one(&self.pool)
                .await?,
            ),
            QuestionType::TrueFalse => AnswerDetails::TrueFalse(
                sqlx::query_as::<_, TrueFalseAnswer>(
                    "SELECT correct_answer FROM true_false_answers WHERE question_id = ?1",
                )
                .bind(question_id)
                .fetch_one(&self.pool)
                .await?,
            ),
            QuestionType::FillBlank => AnswerDetails::FillBlank(
                sqlx::query_as::<_, FillBlankAnswer>(
                    "SELECT correct_answer FROM fill_blank_answers WHERE question_id = ?1",
                )
                .bind(question_id)
                .fetch_one(&self.pool)
                .await?,
            ),
        };
        Ok(details)
    }
}

/// Finds the image path currently attached to a question, whichever choice
/// table holds it.
async fn existing_image_path(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    question_id: i64,
) -> Result<Option<String>> {
    let single: Option<Option<String>> =
        sqlx::query_scalar("SELECT image_path FROM single_choice_answers WHERE question_id = ?1")
            .bind(question_id)
            .fetch_optional(&mut **tx)
            .await?;
    if let Some(path) = single.flatten() {
        return Ok(Some(path));
    }

    let multiple: Option<Option<String>> =
        sqlx::query_scalar("SELECT image_path FROM multiple_choice_answers WHERE question_id = ?1")
            .bind(question_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(multiple.flatten())
}

fn parse_answers(question_type: QuestionType, form: &QuestionForm) -> Result<ParsedAnswers> {
    match question_type {
        QuestionType::SingleChoice => {
            let options = collect_options(form)?;
            let raw = form
                .correct_answer
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            let index: usize = raw.parse().map_err(|_| {
                Error::Validation("Correct option index must be between 1 and 4".into())
            })?;
            if !(1..=4).contains(&index) {
                return Err(Error::Validation(
                    "Correct option index must be between 1 and 4".into(),
                ));
            }
            let correct_answer = options[index - 1].clone();
            Ok(ParsedAnswers::SingleChoice {
                options,
                correct_answer,
            })
        }
        QuestionType::MultipleChoice => {
            let options = collect_options(form)?;
            let raw = form.correct_answers.as_deref().unwrap_or_default();
            let mut selected = Vec::new();
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let index: usize = part.parse().map_err(|_| {
                    Error::Validation("Correct option indices must be between 1 and 4".into())
                })?;
                if !(1..=4).contains(&index) {
                    return Err(Error::Validation(
                        "Correct option indices must be between 1 and 4".into(),
                    ));
                }
                selected.push(options[index - 1].clone());
            }
            if selected.is_empty() {
                return Err(Error::Validation(
                    "At least one correct option must be selected".into(),
                ));
            }
            Ok(ParsedAnswers::MultipleChoice {
                options,
                correct_answers: selected.join(","),
            })
        }
        QuestionType::TrueFalse => {
            // Exact, case-sensitive match, as the portal has always behaved.
            let raw = form.correct_answer.as_deref().unwrap_or_default();
            if raw != "True" && raw != "False" {
                return Err(Error::Validation(
                    "Answer must be exactly \"True\" or \"False\"".into(),
                ));
            }
            Ok(ParsedAnswers::TrueFalse {
                correct_answer: raw.to_string(),
            })
        }
        QuestionType::FillBlank => {
            let answer = form
                .correct_answer
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            if answer.is_empty() {
                return Err(Error::Validation("An expected answer is required".into()));
            }
            Ok(ParsedAnswers::FillBlank {
                correct_answer: answer.to_string(),
            })
        }
    }
}

fn collect_options(form: &QuestionForm) -> Result<[String; 4]> {
    Ok([
        required_option(form.option1.as_deref())?,
        required_option(form.option2.as_deref())?,
        required_option(form.option3.as_deref())?,
        required_option(form.option4.as_deref())?,
    ])
}

fn required_option(opt: Option<&str>) -> Result<String> {
    let trimmed = opt.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(Error::Validation("All four options are required".into()));
    }
    Ok(trimmed.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
