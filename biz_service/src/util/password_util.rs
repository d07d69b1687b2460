//! Argon2id 密码哈希，参数固定（即工作因子），哈希串为 PHC 格式并携带盐和参数

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use common::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// 内存开销（KiB）
    pub memory_kib: u32,
    /// 迭代次数
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { memory_kib: 19 * 1024, iterations: 2, parallelism: 1 }
    }
}

impl PasswordPolicy {
    fn hasher(&self) -> AppResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AppError::Internal(format!("invalid argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
    }

    /// 校验时使用哈希串自带的参数
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::PasswordHash(format!("invalid password hash format: {e}")))?;
        Ok(self.hasher()?.verify_password(password.as_bytes(), &parsed).is_ok())
    }
}

/// CPU 密集，放到阻塞线程池执行
pub async fn hash_password_blocking(policy: PasswordPolicy, password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || policy.hash_password(&password)).await?
}

pub async fn verify_password_blocking(policy: PasswordPolicy, password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || policy.verify_password(&password, &hash)).await?
}
