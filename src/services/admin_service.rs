use crate::dto::auth_dto::{CreateAdminPayload, LoginPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::admin::Admin;
use crate::utils::crypto::{hash_password, verify_password};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AdminService {
    pool: SqlitePool,
}

impl AdminService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_admin(&self, payload: CreateAdminPayload) -> Result<Admin> {
        let email = payload.email.trim().to_lowercase();

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE email = ?1")
            .bind(&email)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Err(Error::Validation(
                "An admin with this email already exists".into(),
            ));
        }

        let password_hash = hash_password(&payload.password)?;

        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (name, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, 'admin', ?4)
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(payload.name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Verifies the credentials and issues a signed bearer token. Wrong email
    /// and wrong password are indistinguishable to the caller.
    pub async fn login(&self, payload: LoginPayload) -> Result<(Admin, String)> {
        let email = payload.email.trim().to_lowercase();

        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, name, email, password_hash, role, created_at FROM admins WHERE email = ?1",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&payload.password, &admin.password_hash)? {
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }

        let token = issue_token(&admin)?;
        Ok((admin, token))
    }
}

fn issue_token(admin: &Admin) -> Result<String> {
    let config = crate::config::get_config();
    let claims = Claims {
        sub: admin.id.to_string(),
        exp: (Utc::now() + Duration::hours(24)).timestamp() as usize,
        role: Some(admin.role.clone()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to issue token: {}", e)))
}
