//! In-process `UserStore` so account flows can be tested without Postgres.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_auth::{Role, UserId};
use tokio::sync::Mutex;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{NewUser, User, UserStore, VerificationTokenRow};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    // user_id -> (token_hash, expires_at)
    tokens: HashMap<UserId, (Vec<u8>, DateTime<Utc>)>,
    next_id: UserId,
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    tables: Mutex<Tables>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: move a user's token expiry.
    pub async fn set_token_expiry(&self, user_id: UserId, expires_at: DateTime<Utc>) {
        if let Some(entry) = self.tables.lock().await.tokens.get_mut(&user_id) {
            entry.1 = expires_at;
        }
    }

    pub async fn deactivate(&self, user_id: UserId) {
        if let Some(user) = self.tables.lock().await.users.get_mut(&user_id) {
            user.is_active = false;
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut t = self.tables.lock().await;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict);
        }

        t.next_id += 1;
        let now = Utc::now();
        let row = User {
            id: t.next_id,
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            phone_number: user.phone_number,
            is_verified: false,
            is_active: true,
            roles: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_profile(
        &self,
        id: UserId,
        full_name: Option<&str>,
        phone_number: Option<&str>,
    ) -> RepoResult<Option<User>> {
        let mut t = self.tables.lock().await;
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = full_name {
            user.full_name = v.to_string();
        }
        if let Some(v) = phone_number {
            user.phone_number = Some(v.to_string());
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn add_role(&self, id: UserId, role: Role) -> RepoResult<bool> {
        let mut t = self.tables.lock().await;
        Ok(t.users
            .get_mut(&id)
            .map(|u| u.roles.insert(role))
            .unwrap_or(false))
    }

    async fn mark_verified(&self, id: UserId) -> RepoResult<()> {
        if let Some(user) = self.tables.lock().await.users.get_mut(&id) {
            user.is_verified = true;
        }
        Ok(())
    }

    async fn replace_verification_token(
        &self,
        user_id: UserId,
        token_hash: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.tables
            .lock()
            .await
            .tokens
            .insert(user_id, (token_hash, expires_at));
        Ok(())
    }

    async fn find_verification_token(
        &self,
        token_hash: &[u8],
    ) -> RepoResult<Option<VerificationTokenRow>> {
        let t = self.tables.lock().await;
        Ok(t.tokens
            .iter()
            .find(|(_, (hash, _))| hash.as_slice() == token_hash)
            .map(|(user_id, (_, expires_at))| VerificationTokenRow {
                user_id: *user_id,
                expires_at: *expires_at,
            }))
    }

    async fn delete_verification_token(&self, user_id: UserId) -> RepoResult<()> {
        self.tables.lock().await.tokens.remove(&user_id);
        Ok(())
    }
}
