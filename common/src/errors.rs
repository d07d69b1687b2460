use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;

/// MongoDB 唯一索引冲突错误码
const DUPLICATE_KEY_CODE: i32 = 11000;

pub type AppResult<T> = Result<T, AppError>;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    // ==== 常规业务错误 ====
    #[error("Resource not found")]
    NotFound,

    #[error("Bad request: {0}")]
    Validation(String),

    #[error("Conflict: resource already exists")]
    Conflict,

    #[error("External API call failed: {0}")]
    ExternalApi(String),

    // ==== 系统错误 ====
    #[error("MongoDB error: {0}")]
    Mongo(MongoError),
    #[error("BSON serialize error: {0}")]
    BsonSer(#[from] mongodb::bson::ser::Error),
    #[error("BSON deserialize error: {0}")]
    BsonDe(#[from] mongodb::bson::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Password hash error: {0}")]
    PasswordHash(String),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// 唯一索引冲突统一转换为 `Conflict`，其余原样保留
impl From<MongoError> for AppError {
    fn from(e: MongoError) -> Self {
        if is_duplicate_key(&e) { AppError::Conflict } else { AppError::Mongo(e) }
    }
}
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}
impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(e.to_string())
    }
}

pub fn is_duplicate_key(e: &MongoError) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY_CODE,
        ErrorKind::InsertMany(im) => im
            .write_errors
            .as_ref()
            .map(|errs| errs.iter().any(|we| we.code == DUPLICATE_KEY_CODE))
            .unwrap_or(false),
        _ => false,
    }
}
