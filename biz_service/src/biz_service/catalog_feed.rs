use crate::entitys::character_entity::CharacterEntity;
use async_trait::async_trait;
use common::errors::{AppError, AppResult};
use std::time::Duration;

/// 角色初始数据来源
#[async_trait]
pub trait CatalogFeed: Send + Sync {
    async fn fetch(&self) -> AppResult<Vec<CharacterEntity>>;
}

/// 从远端 URL 拉取 JSON 数组
pub struct HttpCatalogFeed {
    url: String,
    http_client: reqwest::Client,
}

impl HttpCatalogFeed {
    pub fn new(url: &str) -> AppResult<Self> {
        let http_client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { url: url.to_string(), http_client })
    }
}

#[async_trait]
impl CatalogFeed for HttpCatalogFeed {
    async fn fetch(&self) -> AppResult<Vec<CharacterEntity>> {
        let response = self.http_client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalApi(format!("GET {} returned {}", self.url, status)));
        }
        // raw 文件服务返回 text/plain，不依赖 Content-Type
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// 内置列表，用于离线初始化
pub struct StaticCatalogFeed {
    characters: Vec<CharacterEntity>,
}

impl StaticCatalogFeed {
    pub fn new(characters: Vec<CharacterEntity>) -> Self {
        Self { characters }
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

#[async_trait]
impl CatalogFeed for StaticCatalogFeed {
    async fn fetch(&self) -> AppResult<Vec<CharacterEntity>> {
        Ok(self.characters.clone())
    }
}
