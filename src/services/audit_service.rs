use crate::error::Result;
use crate::models::activity_log::ActivityLog;
use chrono::Utc;
use sqlx::SqlitePool;

/// Identity and request metadata attached to every audited mutation.
#[derive(Debug, Clone, Default)]
pub struct Actor {
    pub admin_id: Option<i64>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct PaginatedLogs {
    pub items: Vec<ActivityLog>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct AuditService {
    pool: SqlitePool,
}

impl AuditService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn log(&self, actor: &Actor, activity: &str) -> Result<ActivityLog> {
        let row = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (admin_id, activity, ip_address, user_agent, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, admin_id, activity, ip_address, user_agent, created_at
            "#,
        )
        .bind(actor.admin_id)
        .bind(activity)
        .bind(&actor.ip)
        .bind(&actor.user_agent)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Audit writes must never fail the operation they describe.
    pub async fn log_best_effort(&self, actor: &Actor, activity: &str) {
        if let Err(err) = self.log(actor, activity).await {
            tracing::warn!(error = ?err, activity, "activity log write failed");
        }
    }

    pub async fn list(&self, page: i64, per_page: i64) -> Result<PaginatedLogs> {
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, admin_id, activity, ip_address, user_agent, created_at
            FROM activity_logs
            ORDER BY id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total_pages = if per_page > 0 {
            ((total as f64) / (per_page as f64)).ceil() as i64
        } else {
            1
        };

        Ok(PaginatedLogs {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }
}
