use crate::dto::result_dto::ResultFilter;
use crate::error::Result;
use crate::models::result::ResultRow;
use sqlx::SqlitePool;

#[derive(Debug, serde::Serialize)]
pub struct PaginatedResults {
    pub items: Vec<ResultRow>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

const RESULT_SELECT: &str = r#"
    SELECT r.id,
           s.first_name || ' ' || s.last_name AS student_name,
           s.reg_no,
           t.class,
           t.subject,
           t.title AS test_title,
           r.score,
           r.total_questions,
           r.submitted_at
    FROM test_results r
    JOIN students s ON s.id = r.student_id
    JOIN tests t ON t.id = r.test_id
    WHERE (?1 IS NULL OR t.class = ?1)
      AND (?2 IS NULL OR t.subject = ?2)
      AND (?3 IS NULL OR r.test_id = ?3)
      AND (?4 IS NULL OR s.first_name || ' ' || s.last_name LIKE ?4 OR s.reg_no LIKE ?4)
"#;

#[derive(Clone)]
pub struct ResultService {
    pool: SqlitePool,
}

impl ResultService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_results(
        &self,
        page: i64,
        per_page: i64,
        filter: ResultFilter,
    ) -> Result<PaginatedResults> {
        let offset = (page - 1) * per_page;
        let (class, subject, test_id, search) = bind_params(&filter);

        let count_sql = format!("SELECT COUNT(*) FROM ({})", RESULT_SELECT);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&class)
            .bind(&subject)
            .bind(test_id)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        let page_sql = format!("{} ORDER BY r.submitted_at DESC LIMIT ?5 OFFSET ?6", RESULT_SELECT);
        let items = sqlx::query_as::<_, ResultRow>(&page_sql)
            .bind(&class)
            .bind(&subject)
            .bind(test_id)
            .bind(&search)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total_pages = if per_page > 0 {
            ((total as f64) / (per_page as f64)).ceil() as i64
        } else {
            1
        };

        Ok(PaginatedResults {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// All matching rows, unpaginated, for the export endpoints.
    pub async fn fetch_all_results(&self, filter: ResultFilter) -> Result<Vec<ResultRow>> {
        let (class, subject, test_id, search) = bind_params(&filter);

        let sql = format!("{} ORDER BY r.submitted_at DESC", RESULT_SELECT);
        let items = sqlx::query_as::<_, ResultRow>(&sql)
            .bind(&class)
            .bind(&subject)
            .bind(test_id)
            .bind(&search)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }
}

fn bind_params(
    filter: &ResultFilter,
) -> (
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
) {
    (
        filter.class.clone(),
        filter.subject.as_ref().map(|s| s.to_lowercase()),
        filter.test_id,
        filter.search.as_ref().map(|s| format!("%{}%", s)),
    )
}
