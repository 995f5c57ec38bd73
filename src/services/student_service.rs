use crate::dto::school_dto::{CreateStudentPayload, UpdateStudentPayload};
use crate::error::{Error, Result};
use crate::models::student::Student;
use crate::services::audit_service::{Actor, AuditService};
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Debug, serde::Serialize)]
pub struct PaginatedStudents {
    pub items: Vec<Student>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct StudentService {
    pool: SqlitePool,
    audit: AuditService,
}

impl StudentService {
    pub fn new(pool: SqlitePool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    pub async fn create_student(
        &self,
        payload: CreateStudentPayload,
        actor: &Actor,
    ) -> Result<Student> {
        let reg_no = payload.reg_no.trim().to_string();

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE reg_no = ?1")
            .bind(&reg_no)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Err(Error::Validation(
                "A student with this registration number already exists".into(),
            ));
        }

        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (first_name, last_name, reg_no, class, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, first_name, last_name, reg_no, class, created_at
            "#,
        )
        .bind(payload.first_name.trim())
        .bind(payload.last_name.trim())
        .bind(&reg_no)
        .bind(payload.class.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .log_best_effort(
                actor,
                &format!(
                    "Registered student: {} {} ({})",
                    student.first_name, student.last_name, student.reg_no
                ),
            )
            .await;

        Ok(student)
    }

    pub async fn update_student(
        &self,
        student_id: i64,
        payload: UpdateStudentPayload,
    ) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students
            SET first_name = COALESCE(?1, first_name),
                last_name = COALESCE(?2, last_name),
                class = COALESCE(?3, class)
            WHERE id = ?4
            RETURNING id, first_name, last_name, reg_no, class, created_at
            "#,
        )
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.class)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Student not found".to_string()))?;

        Ok(student)
    }

    pub async fn list_students(
        &self,
        page: i64,
        per_page: i64,
        class: Option<String>,
        search: Option<String>,
    ) -> Result<PaginatedStudents> {
        let offset = (page - 1) * per_page;
        let search = search.map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM students
            WHERE (?1 IS NULL OR class = ?1)
              AND (?2 IS NULL OR first_name || ' ' || last_name LIKE ?2 OR reg_no LIKE ?2)
            "#,
        )
        .bind(&class)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, first_name, last_name, reg_no, class, created_at
            FROM students
            WHERE (?1 IS NULL OR class = ?1)
              AND (?2 IS NULL OR first_name || ' ' || last_name LIKE ?2 OR reg_no LIKE ?2)
            ORDER BY last_name, first_name
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(&class)
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

        Ok(PaginatedStudents {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn delete_student(&self, student_id: i64, actor: &Actor) -> Result<()> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, first_name, last_name, reg_no, class, created_at FROM students WHERE id = ?1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Student not found".to_string()))?;

        sqlx::query("DELETE FROM students WHERE id = ?1")
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        self.audit
            .log_best_effort(
                actor,
                &format!("Deleted student: {} ({})", student.last_name, student.reg_no),
            )
            .await;

        Ok(())
    }
}
