use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::auth::repo_types::{NewUser, UniqueField, User};
use crate::db::StoreError;

/// Credential store.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Single lookup matching either column; a username match wins over an email match.
    async fn find_by_username_or_email(&self, key: &str) -> Result<Option<User>, StoreError>;

    /// Exact-match existence check over all rows, active or not.
    async fn exists(&self, field: UniqueField, value: &str) -> Result<bool, StoreError>;

    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn record_login(&self, id: i64, at: OffsetDateTime) -> Result<User, StoreError>;

    /// Returns false when there was no active user with this id.
    async fn deactivate(&self, id: i64) -> Result<bool, StoreError>;

    async fn list_active(&self) -> Result<Vec<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, xp_level,
                   phone_number, role, created_at, last_login_at, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username_or_email(&self, key: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, xp_level,
                   phone_number, role, created_at, last_login_at, is_active
            FROM users
            WHERE username = $1 OR email = $1
            ORDER BY (username = $1) DESC, id
            LIMIT 1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn exists(&self, field: UniqueField, value: &str) -> Result<bool, StoreError> {
        let sql = match field {
            UniqueField::Username => "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)",
            UniqueField::Email => "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
            UniqueField::PhoneNumber => {
                "SELECT EXISTS (SELECT 1 FROM users WHERE phone_number = $1)"
            }
        };
        let found = sqlx::query_scalar::<_, bool>(sql)
            .bind(value)
            .fetch_one(&self.db)
            .await?;
        Ok(found)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash,
                               xp_level, phone_number, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, username, email, first_name, last_name, password_hash, xp_level,
                      phone_number, role, created_at, last_login_at, is_active
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.xp_level)
        .bind(&user.phone_number)
        .bind(user.role.as_str())
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }

    async fn record_login(&self, id: i64, at: OffsetDateTime) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET last_login_at = $2
            WHERE id = $1
            RETURNING id, username, email, first_name, last_name, password_hash, xp_level,
                      phone_number, role, created_at, last_login_at, is_active
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.db)
        .await?;
        user.ok_or_else(|| StoreError::Backend(anyhow::anyhow!("user {} not found", id)))
    }

    async fn deactivate(&self, id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1 AND is_active")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn list_active(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, xp_level,
                   phone_number, role, created_at, last_login_at, is_active
            FROM users
            WHERE is_active
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }
}
