use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// 排序方向，`Asc` 对应 1，`Desc` 对应 -1
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrderType {
    #[default]
    Asc,
    Desc,
}

impl OrderType {
    pub fn as_sort_value(&self) -> i32 {
        match self {
            OrderType::Asc => 1,
            OrderType::Desc => -1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderType::Asc => "Ascending",
            OrderType::Desc => "Descending",
        }
    }
}

impl TryFrom<i32> for OrderType {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OrderType::Asc),
            -1 => Ok(OrderType::Desc),
            other => Err(AppError::Validation(format!("unsupported sort direction: {}", other))),
        }
    }
}

#[async_trait]
pub trait Repository<T>: Send + Sync {
    async fn find_one(&self, filter: Document) -> AppResult<Option<T>>;
    async fn query_all(&self) -> AppResult<Vec<T>>;
    async fn query(&self, filter: Document, sort: Option<Document>) -> AppResult<Vec<T>>;
    async fn count(&self, filter: Document) -> AppResult<u64>;
    /// 命中唯一索引时返回 `AppError::Conflict`
    async fn insert(&self, entity: &T) -> AppResult<()>;
    async fn insert_many(&self, entities: &[T]) -> AppResult<()>;
    /// 返回匹配的文档数
    async fn update_one(&self, filter: Document, update: Document) -> AppResult<u64>;
}

pub struct BaseRepository<T: Send + Sync> {
    pub collection: Collection<T>, // 线程安全的数据库连接池
    _marker: PhantomData<T>,
}

impl<T: Send + Sync> BaseRepository<T> {
    pub fn new(collection: Collection<T>) -> Self {
        Self { collection, _marker: Default::default() }
    }
}

#[async_trait]
impl<T> Repository<T> for BaseRepository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    async fn find_one(&self, filter: Document) -> AppResult<Option<T>> {
        let result = self.collection.find_one(filter).await?;
        Ok(result)
    }

    async fn query_all(&self) -> AppResult<Vec<T>> {
        self.query(doc! {}, None).await
    }

    async fn query(&self, filter: Document, sort: Option<Document>) -> AppResult<Vec<T>> {
        let find_options = FindOptions::builder().sort(sort).build();
        let mut cursor = self.collection.find(filter).with_options(find_options).await?;
        let mut result = vec![];
        while let Some(doc) = cursor.try_next().await? {
            result.push(doc);
        }
        Ok(result)
    }

    async fn count(&self, filter: Document) -> AppResult<u64> {
        let total = self.collection.count_documents(filter).await?;
        Ok(total)
    }

    async fn insert(&self, entity: &T) -> AppResult<()> {
        self.collection.insert_one(entity).await?;
        Ok(())
    }

    async fn insert_many(&self, entities: &[T]) -> AppResult<()> {
        if entities.is_empty() {
            return Ok(());
        }
        self.collection.insert_many(entities).await?;
        Ok(())
    }

    async fn update_one(&self, filter: Document, update: Document) -> AppResult<u64> {
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count)
    }
}
