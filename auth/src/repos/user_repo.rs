/*
 * Responsibility
 * - users / user_roles / verification_tokens access behind the `UserStore` trait
 * - Postgres implementation with SQLx runtime queries
 * - Roles come back as a set; strings this build does not know are dropped
 */
use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_auth::{Role, UserId};
use sqlx::PgPool;
use tracing::warn;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub roles: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    full_name: String,
    phone_number: Option<String>,
    is_verified: bool,
    is_active: bool,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let roles = row
            .roles
            .iter()
            .filter_map(|r| match r.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    warn!(user_id = row.id, error = %e, "skipping stored role");
                    None
                }
            })
            .collect();

        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            phone_number: row.phone_number,
            is_verified: row.is_verified,
            is_active: row.is_active,
            roles,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VerificationTokenRow {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Persistence boundary for accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `RepoError::Conflict` when the email is already registered.
    async fn create(&self, user: NewUser) -> RepoResult<User>;

    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// `None` fields are left as they are.
    async fn update_profile(
        &self,
        id: UserId,
        full_name: Option<&str>,
        phone_number: Option<&str>,
    ) -> RepoResult<Option<User>>;

    /// Returns false when the user already held the role.
    async fn add_role(&self, id: UserId, role: Role) -> RepoResult<bool>;

    async fn mark_verified(&self, id: UserId) -> RepoResult<()>;

    /// Stores a new token for the user, dropping any earlier one.
    async fn replace_verification_token(
        &self,
        user_id: UserId,
        token_hash: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<()>;

    async fn find_verification_token(
        &self,
        token_hash: &[u8],
    ) -> RepoResult<Option<VerificationTokenRow>>;

    async fn delete_verification_token(&self, user_id: UserId) -> RepoResult<()>;
}

const SELECT_USER: &str = r#"
    SELECT
        u.id, u.email, u.password_hash, u.full_name, u.phone_number,
        u.is_verified, u.is_active, u.created_at, u.updated_at,
        COALESCE(
            array_agg(r.role::TEXT ORDER BY r.role) FILTER (WHERE r.role IS NOT NULL),
            '{}'::TEXT[]
        ) AS roles
    FROM users u
    LEFT JOIN user_roles r ON r.user_id = u.id
"#;

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE u.id = $1 GROUP BY u.id");

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, password_hash, full_name, phone_number)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.phone_number.as_deref())
        .fetch_one(&self.pool)
        .await?;

        self.fetch_one_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Db(sqlx::Error::RowNotFound))
    }

    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        self.fetch_one_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE u.email = $1 GROUP BY u.id");

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn update_profile(
        &self,
        id: UserId,
        full_name: Option<&str>,
        phone_number: Option<&str>,
    ) -> RepoResult<Option<User>> {
        let done = sqlx::query(
            r#"
            UPDATE users
            SET
                full_name = COALESCE($2, full_name),
                phone_number = COALESCE($3, phone_number),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(phone_number)
        .execute(&self.pool)
        .await?;

        if done.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_one_by_id(id).await
    }

    async fn add_role(&self, id: UserId, role: Role) -> RepoResult<bool> {
        let done = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(done.rows_affected() > 0)
    }

    async fn mark_verified(&self, id: UserId) -> RepoResult<()> {
        sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace_verification_token(
        &self,
        user_id: UserId,
        token_hash: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET token_hash = EXCLUDED.token_hash,
                expires_at = EXCLUDED.expires_at,
                created_at = now()
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_verification_token(
        &self,
        token_hash: &[u8],
    ) -> RepoResult<Option<VerificationTokenRow>> {
        let row = sqlx::query_as::<_, VerificationTokenRow>(
            r#"
            SELECT user_id, expires_at
            FROM verification_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_verification_token(&self, user_id: UserId) -> RepoResult<()> {
        sqlx::query("DELETE FROM verification_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
