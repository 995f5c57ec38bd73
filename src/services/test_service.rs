use crate::dto::test_dto::CreateTestPayload;
use crate::error::{Error, Result};
use crate::models::test::Test;
use crate::services::audit_service::{Actor, AuditService};
use crate::utils::validation::is_valid_subject;
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Debug, serde::Serialize)]
pub struct PaginatedTests {
    #[serde(rename = "items")]
    pub tests: Vec<Test>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Default)]
pub struct TestFilter {
    pub class: Option<String>,
    pub subject: Option<String>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct TestService {
    pool: SqlitePool,
    audit: AuditService,
}

impl TestService {
    pub fn new(pool: SqlitePool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    pub async fn create_test(&self, payload: CreateTestPayload, actor: &Actor) -> Result<Test> {
        let title = payload.title.trim().to_string();
        let class = payload.class.trim().to_string();
        let subject = payload.subject.trim().to_lowercase();

        if !is_valid_subject(&class, &subject) {
            return Err(Error::Validation(format!(
                "Subject \"{}\" is not offered for class {}",
                subject, class
            )));
        }

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tests WHERE title = ?1 AND class = ?2 AND subject = ?3",
        )
        .bind(&title)
        .bind(&class)
        .bind(&subject)
        .fetch_one(&self.pool)
        .await?;
        if existing > 0 {
            return Err(Error::Validation(
                "A test with this title already exists for that class and subject".into(),
            ));
        }

        let test = sqlx::query_as::<_, Test>(
            r#"
            INSERT INTO tests (title, class, subject, duration_minutes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, title, class, subject, duration_minutes, created_at
            "#,
        )
        .bind(&title)
        .bind(&class)
        .bind(&subject)
        .bind(payload.duration_minutes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .log_best_effort(actor, &format!("Created test: {}", test.title))
            .await;

        Ok(test)
    }

    pub async fn get_test_by_id(&self, test_id: i64) -> Result<Test> {
        let test = sqlx::query_as::<_, Test>(
            "SELECT id, title, class, subject, duration_minutes, created_at FROM tests WHERE id = ?1",
        )
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(test)
    }

    /// Duration is the only field a test allows changing after creation.
    pub async fn update_duration(
        &self,
        test_id: i64,
        duration_minutes: i64,
        actor: &Actor,
    ) -> Result<Test> {
        let test = sqlx::query_as::<_, Test>(
            r#"
            UPDATE tests SET duration_minutes = ?1 WHERE id = ?2
            RETURNING id, title, class, subject, duration_minutes, created_at
            "#,
        )
        .bind(duration_minutes)
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        self.audit
            .log_best_effort(
                actor,
                &format!(
                    "Updated test duration: {} -> {} minutes",
                    test.title, duration_minutes
                ),
            )
            .await;

        Ok(test)
    }

    pub async fn list_tests(
        &self,
        page: i64,
        per_page: i64,
        filter: Option<TestFilter>,
    ) -> Result<PaginatedTests> {
        let offset = (page - 1) * per_page;
        let filter = filter.unwrap_or_default();

        let class_param = filter.class;
        let subject_param = filter.subject.map(|s| s.to_lowercase());
        let search_param = filter.search.map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tests
            WHERE (?1 IS NULL OR class = ?1)
              AND (?2 IS NULL OR subject = ?2)
              AND (?3 IS NULL OR title LIKE ?3)
            "#,
        )
        .bind(&class_param)
        .bind(&subject_param)
        .bind(&search_param)
        .fetch_one(&self.pool)
        .await?;

        let total_pages = if per_page > 0 {
            ((total as f64) / (per_page as f64)).ceil() as i64
        } else {
            1
        };

        let tests = sqlx::query_as::<_, Test>(
            r#"
            SELECT id, title, class, subject, duration_minutes, created_at
            FROM tests
            WHERE (?1 IS NULL OR class = ?1)
              AND (?2 IS NULL OR subject = ?2)
              AND (?3 IS NULL OR title LIKE ?3)
            ORDER BY created_at DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )
        .bind(&class_param)
        .bind(&subject_param)
        .bind(&search_param)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(PaginatedTests {
            tests,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Deletes a test; its questions and answer rows go with it via the schema
    /// cascade. Returns the image paths of its questions so the caller can
    /// clean the files up best-effort after the delete has committed.
    pub async fn delete_test(&self, test_id: i64, actor: &Actor) -> Result<Vec<String>> {
        let test = sqlx::query_as::<_, Test>(
            "SELECT id, title, class, subject, duration_minutes, created_at FROM tests WHERE id = ?1",
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        let mut images: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT a.image_path FROM single_choice_answers a
            JOIN questions q ON q.id = a.question_id
            WHERE q.test_id = ?1 AND a.image_path IS NOT NULL
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        let multi: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT a.image_path FROM multiple_choice_answers a
            JOIN questions q ON q.id = a.question_id
            WHERE q.test_id = ?1 AND a.image_path IS NOT NULL
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        images.extend(multi);

        sqlx::query("DELETE FROM tests WHERE id = ?1")
            .bind(test_id)
            .execute(&self.pool)
            .await?;

        self.audit
            .log_best_effort(actor, &format!("Deleted test: {}", test.title))
            .await;

        Ok(images)
    }
}
