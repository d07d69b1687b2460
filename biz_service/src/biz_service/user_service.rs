use crate::entitys::user_entity::{UserEntity, UserRole, USER_COLLECTION};
use crate::util::password_util::{hash_password_blocking, verify_password_blocking, PasswordPolicy};
use common::db::Db;
use common::errors::{AppError, AppResult};
use common::query_builder::QueryBuilder;
use common::repository_util::{BaseRepository, Repository};
use log::{info, warn};
use mongodb::bson::doc;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// 注册 / 登录提交的凭据，两者都不能为空
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self { username: username.to_string(), password: password.to_string() }
    }
}

pub struct UserService {
    pub dao: Arc<dyn Repository<UserEntity>>,
    policy: PasswordPolicy,
}

impl UserService {
    pub fn new(db: &Db) -> Self {
        let collection = db.collection(USER_COLLECTION);
        Self::with_repository(Arc::new(BaseRepository::new(collection)), PasswordPolicy::default())
    }

    pub fn with_repository(dao: Arc<dyn Repository<UserEntity>>, policy: PasswordPolicy) -> Self {
        Self { dao, policy }
    }

    /// 凭据为空或用户名已存在时返回 `false`。
    ///
    /// 先查重；并发注册之间的竞争由用户名唯一索引兜底（冲突同样返回 `false`）。
    pub async fn register_user(&self, username: &str, password: &str, role: UserRole) -> AppResult<bool> {
        let credentials = Credentials::new(username, password);
        if credentials.validate().is_err() {
            return Ok(false);
        }
        if self.find_by_username(&credentials.username).await?.is_some() {
            return Ok(false);
        }
        let hashed = hash_password_blocking(self.policy, credentials.password).await?;
        let user = UserEntity { oid: None, username: credentials.username, password: hashed, role };
        match self.dao.insert(&user).await {
            Ok(()) => {
                info!("user registered: {} ({})", user.username, user.role);
                Ok(true)
            }
            Err(AppError::Conflict) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// 失败原因不区分：空凭据、用户不存在、密码错误都返回 `None`。
    /// 返回的记录包含密码哈希，调用方不要向外暴露
    pub async fn login_user(&self, username: &str, password: &str) -> AppResult<Option<UserEntity>> {
        if username.is_empty() || password.is_empty() {
            return Ok(None);
        }
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(None);
        };
        match verify_password_blocking(self.policy, password.to_string(), user.password.clone()).await {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(AppError::PasswordHash(e)) => {
                warn!("stored password hash of {} is unreadable: {}", username, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<UserEntity>> {
        self.dao.find_one(QueryBuilder::new().eq("username", username).build()).await
    }

    pub async fn is_empty(&self) -> AppResult<bool> {
        Ok(self.dao.count(doc! {}).await? == 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entitys::user_entity::user_index_models;
    use common::index_trait::unique_keys_of;
    use common::memory_repository::MemoryRepository;

    pub(crate) fn test_service() -> UserService {
        let repo: MemoryRepository<UserEntity> = MemoryRepository::new(unique_keys_of(&user_index_models()));
        let policy = PasswordPolicy { memory_kib: 1024, iterations: 1, parallelism: 1 };
        UserService::with_repository(Arc::new(repo), policy)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = test_service();
        assert!(service.register_user("sova", "hunter2", UserRole::User).await.unwrap());
        let user = service.login_user("sova", "hunter2").await.unwrap().unwrap();
        assert_eq!(user.username, "sova");
        assert_eq!(user.role, UserRole::User);
        assert_ne!(user.password, "hunter2");
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let service = test_service();
        assert!(service.register_user("omen", "first", UserRole::Admin).await.unwrap());
        assert!(!service.register_user("omen", "second", UserRole::User).await.unwrap());
        // 原账号不受影响
        let user = service.login_user("omen", "first").await.unwrap().unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(service.login_user("omen", "second").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_winner() {
        let service = Arc::new(test_service());
        let a = tokio::spawn({
            let service = service.clone();
            async move { service.register_user("neon", "a", UserRole::User).await.unwrap() }
        });
        let b = tokio::spawn({
            let service = service.clone();
            async move { service.register_user("neon", "b", UserRole::User).await.unwrap() }
        });
        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a ^ b);
        assert_eq!(service.dao.count(doc! { "username": "neon" }).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_rejected_without_unique_index() {
        let repo: MemoryRepository<UserEntity> = MemoryRepository::new(vec![]);
        let policy = PasswordPolicy { memory_kib: 1024, iterations: 1, parallelism: 1 };
        let service = UserService::with_repository(Arc::new(repo), policy);
        assert!(service.register_user("omen", "first", UserRole::User).await.unwrap());
        assert!(!service.register_user("omen", "second", UserRole::User).await.unwrap());
        assert_eq!(service.dao.count(doc! { "username": "omen" }).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_hash_is_failed_login() {
        let service = test_service();
        let broken = UserEntity { oid: None, username: "yoru".into(), password: "plain-text".into(), role: UserRole::User };
        service.dao.insert(&broken).await.unwrap();
        assert!(service.login_user("yoru", "plain-text").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_credentials() {
        let service = test_service();
        assert!(!service.register_user("", "pw", UserRole::User).await.unwrap());
        assert!(!service.register_user("raze", "", UserRole::User).await.unwrap());
        assert!(service.is_empty().await.unwrap());
        assert!(service.login_user("", "pw").await.unwrap().is_none());
        assert!(service.login_user("raze", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let service = test_service();
        service.register_user("cypher", "secret", UserRole::User).await.unwrap();
        assert!(service.login_user("cypher", "Secret").await.unwrap().is_none());
        assert!(service.login_user("killjoy", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_password_stored_hashed() {
        let service = test_service();
        service.register_user("viper", "toxin", UserRole::User).await.unwrap();
        let stored = service.find_by_username("viper").await.unwrap().unwrap();
        assert!(stored.password.starts_with("$argon2id$"));
    }
}
