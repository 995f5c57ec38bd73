use crate::dto::school_dto::{AssignTeacherPayload, CreateTeacherPayload};
use crate::error::{Error, Result};
use crate::models::school::{Teacher, TeacherAssignment};
use crate::services::audit_service::{Actor, AuditService};
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct StaffService {
    pool: SqlitePool,
    audit: AuditService,
}

impl StaffService {
    pub fn new(pool: SqlitePool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    pub async fn create_teacher(
        &self,
        payload: CreateTeacherPayload,
        actor: &Actor,
    ) -> Result<Teacher> {
        let email = payload.email.trim().to_lowercase();

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers WHERE email = ?1")
            .bind(&email)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Err(Error::Validation(
                "A teacher with this email already exists".into(),
            ));
        }

        let teacher = sqlx::query_as::<_, Teacher>(
            r#"
            INSERT INTO teachers (name, email, phone, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, name, email, phone, created_at
            "#,
        )
        .bind(payload.name.trim())
        .bind(&email)
        .bind(&payload.phone)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .log_best_effort(actor, &format!("Added teacher: {}", teacher.name))
            .await;

        Ok(teacher)
    }

    pub async fn list_teachers(&self) -> Result<Vec<Teacher>> {
        let teachers = sqlx::query_as::<_, Teacher>(
            "SELECT id, name, email, phone, created_at FROM teachers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(teachers)
    }

    pub async fn delete_teacher(&self, teacher_id: i64, actor: &Actor) -> Result<()> {
        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT id, name, email, phone, created_at FROM teachers WHERE id = ?1",
        )
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Teacher not found".to_string()))?;

        sqlx::query("DELETE FROM teachers WHERE id = ?1")
            .bind(teacher_id)
            .execute(&self.pool)
            .await?;

        self.audit
            .log_best_effort(actor, &format!("Removed teacher: {}", teacher.name))
            .await;

        Ok(())
    }

    /// Assigns a teacher to a (class, subject) pair. Assignments are unique
    /// per teacher, class, and subject.
    pub async fn assign_teacher(
        &self,
        teacher_id: i64,
        payload: AssignTeacherPayload,
        actor: &Actor,
    ) -> Result<TeacherAssignment> {
        let class = payload.class.trim().to_string();
        let subject = payload.subject.trim().to_lowercase();

        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT id, name, email, phone, created_at FROM teachers WHERE id = ?1",
        )
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Teacher not found".to_string()))?;

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM teacher_assignments WHERE teacher_id = ?1 AND class = ?2 AND subject = ?3",
        )
        .bind(teacher_id)
        .bind(&class)
        .bind(&subject)
        .fetch_one(&self.pool)
        .await?;
        if existing > 0 {
            return Err(Error::Validation(
                "This teacher is already assigned to that class and subject".into(),
            ));
        }

        let assignment = sqlx::query_as::<_, TeacherAssignment>(
            r#"
            INSERT INTO teacher_assignments (teacher_id, class, subject)
            VALUES (?1, ?2, ?3)
            RETURNING id, teacher_id, class, subject
            "#,
        )
        .bind(teacher_id)
        .bind(&class)
        .bind(&subject)
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .log_best_effort(
                actor,
                &format!("Assigned {} to {} {}", teacher.name, class, subject),
            )
            .await;

        Ok(assignment)
    }

    pub async fn list_assignments(&self, teacher_id: i64) -> Result<Vec<TeacherAssignment>> {
        let assignments = sqlx::query_as::<_, TeacherAssignment>(
            r#"
            SELECT id, teacher_id, class, subject
            FROM teacher_assignments
            WHERE teacher_id = ?1
            ORDER BY class, subject
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    pub async fn remove_assignment(&self, assignment_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM teacher_assignments WHERE id = ?1")
            .bind(assignment_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Assignment not found".to_string()));
        }
        Ok(())
    }
}
