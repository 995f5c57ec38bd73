use crate::error::{Error, Result};
use crate::models::school::{AcademicSession, SchoolClass, Subject};
use crate::services::audit_service::{Actor, AuditService};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AcademicService {
    pool: SqlitePool,
    audit: AuditService,
}

impl AcademicService {
    pub fn new(pool: SqlitePool) -> Self {
        let audit = AuditService::new(pool.clone());
        Self { pool, audit }
    }

    pub async fn create_session(&self, name: &str, actor: &Actor) -> Result<AcademicSession> {
        let name = name.trim();

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM academic_sessions WHERE name = ?1")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        if existing > 0 {
            return Err(Error::Validation(
                "An academic session with this name already exists".into(),
            ));
        }

        let session = sqlx::query_as::<_, AcademicSession>(
            r#"
            INSERT INTO academic_sessions (name, is_current) VALUES (?1, 0)
            RETURNING id, name, is_current
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        self.audit
            .log_best_effort(actor, &format!("Created academic session: {}", name))
            .await;

        Ok(session)
    }

    /// Marks one session as current; whichever session held the flag loses it
    /// in the same transaction.
    pub async fn set_current_session(&self, session_id: i64, actor: &Actor) -> Result<AcademicSession> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE academic_sessions SET is_current = 0 WHERE is_current = 1")
            .execute(&mut *tx)
            .await?;

        let session = sqlx::query_as::<_, AcademicSession>(
            r#"
            UPDATE academic_sessions SET is_current = 1 WHERE id = ?1
            RETURNING id, name, is_current
            "#,
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Academic session not found".to_string()))?;

        tx.commit().await?;

        self.audit
            .log_best_effort(
                actor,
                &format!("Set current academic session: {}", session.name),
            )
            .await;

        Ok(session)
    }

    pub async fn list_sessions(&self) -> Result<Vec<AcademicSession>> {
        let sessions = sqlx::query_as::<_, AcademicSession>(
            "SELECT id, name, is_current FROM academic_sessions ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    pub async fn delete_session(&self, session_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM academic_sessions WHERE id = ?1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Academic session not found".to_string()));
        }
        Ok(())
    }

    pub async fn create_class(&self, name: &str) -> Result<SchoolClass> {
        let name = name.trim();

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classes WHERE name = ?1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Err(Error::Validation(
                "A class with this name already exists".into(),
            ));
        }

        let class = sqlx::query_as::<_, SchoolClass>(
            "INSERT INTO classes (name) VALUES (?1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(class)
    }

    pub async fn list_classes(&self) -> Result<Vec<SchoolClass>> {
        let classes =
            sqlx::query_as::<_, SchoolClass>("SELECT id, name FROM classes ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(classes)
    }

    pub async fn delete_class(&self, class_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM classes WHERE id = ?1")
            .bind(class_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Class not found".to_string()));
        }
        Ok(())
    }

    pub async fn create_subject(&self, name: &str) -> Result<Subject> {
        // Subject names are stored lowercase; the tier allow-lists and the
        // test queries compare against the lowercase form.
        let name = name.trim().to_lowercase();

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects WHERE name = ?1")
            .bind(&name)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Err(Error::Validation(
                "A subject with this name already exists".into(),
            ));
        }

        let subject = sqlx::query_as::<_, Subject>(
            "INSERT INTO subjects (name) VALUES (?1) RETURNING id, name",
        )
        .bind(&name)
        .fetch_one(&self.pool)
        .await?;
        Ok(subject)
    }

    pub async fn list_subjects(&self) -> Result<Vec<Subject>> {
        let subjects = sqlx::query_as::<_, Subject>("SELECT id, name FROM subjects ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(subjects)
    }

    pub async fn delete_subject(&self, subject_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = ?1")
            .bind(subject_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Subject not found".to_string()));
        }
        Ok(())
    }
}
