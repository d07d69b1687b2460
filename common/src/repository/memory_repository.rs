//! 内存版 `Repository`，只覆盖 service 层用到的查询子集：
//! 字段相等、`$regex` + `$options`、`$set` 更新、单字段排序、唯一索引。

use crate::errors::{AppError, AppResult};
use crate::repository_util::Repository;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document};
use regex::RegexBuilder;
use serde::{de::DeserializeOwned, Serialize};
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Mutex;

pub struct MemoryRepository<T> {
    docs: Mutex<Vec<Document>>,
    unique_keys: Vec<Vec<String>>,
    _marker: PhantomData<T>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new(vec![])
    }
}

impl<T> MemoryRepository<T> {
    pub fn new(unique_keys: Vec<Vec<String>>) -> Self {
        Self { docs: Mutex::new(vec![]), unique_keys, _marker: PhantomData }
    }

    /// 当前存储的原始文档快照
    pub fn snapshot(&self) -> Vec<Document> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Document>> {
        self.docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn violates_unique(&self, docs: &[Document], candidate: &Document) -> bool {
        self.unique_keys.iter().any(|keys| {
            docs.iter().any(|existing| keys.iter().all(|k| existing.get(k) == candidate.get(k)))
        })
    }
}

impl<T> MemoryRepository<T>
where
    T: Serialize,
{
    fn to_stored(entity: &T) -> AppResult<Document> {
        let mut doc = bson::to_document(entity)?;
        if !doc.contains_key("_id") {
            doc.insert("_id", ObjectId::new());
        }
        Ok(doc)
    }
}

#[async_trait]
impl<T> Repository<T> for MemoryRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn find_one(&self, filter: Document) -> AppResult<Option<T>> {
        let docs = self.lock();
        for doc in docs.iter() {
            if matches_filter(doc, &filter)? {
                return Ok(Some(bson::from_document(doc.clone())?));
            }
        }
        Ok(None)
    }

    async fn query_all(&self) -> AppResult<Vec<T>> {
        self.query(Document::new(), None).await
    }

    async fn query(&self, filter: Document, sort: Option<Document>) -> AppResult<Vec<T>> {
        let mut matched = vec![];
        for doc in self.lock().iter() {
            if matches_filter(doc, &filter)? {
                matched.push(doc.clone());
            }
        }
        if let Some(sort) = sort {
            let (field, direction) = parse_sort(&sort)?;
            // 稳定排序，相同键保持存储顺序
            matched.sort_by(|a, b| {
                let ord = compare_bson(a.get(&field), b.get(&field));
                if direction < 0 { ord.reverse() } else { ord }
            });
        }
        matched.into_iter().map(|d| bson::from_document(d).map_err(AppError::from)).collect()
    }

    async fn count(&self, filter: Document) -> AppResult<u64> {
        let mut total = 0;
        for doc in self.lock().iter() {
            if matches_filter(doc, &filter)? {
                total += 1;
            }
        }
        Ok(total)
    }

    async fn insert(&self, entity: &T) -> AppResult<()> {
        let doc = Self::to_stored(entity)?;
        let mut docs = self.lock();
        if self.violates_unique(&docs, &doc) {
            return Err(AppError::Conflict);
        }
        docs.push(doc);
        Ok(())
    }

    /// 与 MongoDB 有序插入一致：遇到冲突即停止，之前的文档保留
    async fn insert_many(&self, entities: &[T]) -> AppResult<()> {
        let mut docs = self.lock();
        for entity in entities {
            let doc = Self::to_stored(entity)?;
            if self.violates_unique(&docs, &doc) {
                return Err(AppError::Conflict);
            }
            docs.push(doc);
        }
        Ok(())
    }

    async fn update_one(&self, filter: Document, update: Document) -> AppResult<u64> {
        let set = match update.get("$set") {
            Some(Bson::Document(set)) => set.clone(),
            _ => return Err(AppError::Internal(format!("unsupported update: {}", update))),
        };
        let mut docs = self.lock();
        let mut index = None;
        for (i, doc) in docs.iter().enumerate() {
            if matches_filter(doc, &filter)? {
                index = Some(i);
                break;
            }
        }
        let Some(index) = index else {
            return Ok(0);
        };
        let mut updated = docs[index].clone();
        for (k, v) in set {
            updated.insert(k, v);
        }
        let others: Vec<Document> =
            docs.iter().enumerate().filter(|(i, _)| *i != index).map(|(_, d)| d.clone()).collect();
        if self.violates_unique(&others, &updated) {
            return Err(AppError::Conflict);
        }
        docs[index] = updated;
        Ok(1)
    }
}

fn matches_filter(doc: &Document, filter: &Document) -> AppResult<bool> {
    for (field, cond) in filter {
        let value = doc.get(field);
        let ok = match cond {
            Bson::Document(op) if op.contains_key("$regex") => {
                let pattern = op.get_str("$regex").map_err(|e| AppError::Internal(e.to_string()))?;
                let options = op.get_str("$options").unwrap_or("");
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(options.contains('i'))
                    .build()
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                matches!(value, Some(Bson::String(s)) if re.is_match(s))
            }
            other => value == Some(other),
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn parse_sort(sort: &Document) -> AppResult<(String, i32)> {
    let mut iter = sort.iter();
    let (field, direction) = match (iter.next(), iter.next()) {
        (Some(entry), None) => entry,
        _ => return Err(AppError::Internal(format!("unsupported sort: {}", sort))),
    };
    let direction = match direction {
        Bson::Int32(v) => *v,
        Bson::Int64(v) => *v as i32,
        other => return Err(AppError::Internal(format!("unsupported sort direction: {}", other))),
    };
    Ok((field.clone(), direction))
}

/// 近似 MongoDB 的跨类型排序：缺失/Null < 数字 < 字符串 < 布尔
fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    fn rank(v: Option<&Bson>) -> u8 {
        match v {
            None | Some(Bson::Null) => 0,
            Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
            Some(Bson::String(_)) => 2,
            Some(Bson::Boolean(_)) => 3,
            Some(_) => 4,
        }
    }
    fn number(v: &Bson) -> f64 {
        match v {
            Bson::Int32(n) => *n as f64,
            Bson::Int64(n) => *n as f64,
            Bson::Double(n) => *n,
            _ => 0.0,
        }
    }
    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(x), Some(y)) if rank(a) == 1 && rank(b) == 1 => {
            number(x).partial_cmp(&number(y)).unwrap_or(Ordering::Equal)
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Item {
        code: String,
        label: String,
        weight: i32,
    }

    fn item(code: &str, label: &str, weight: i32) -> Item {
        Item { code: code.into(), label: label.into(), weight }
    }

    async fn seeded() -> MemoryRepository<Item> {
        let repo = MemoryRepository::new(vec![vec!["code".to_string()]]);
        repo.insert_many(&[item("a", "Zyra", 3), item("b", "alpha", 1), item("c", "LAZY", 2)]).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_regex_and_sort() {
        let repo = seeded().await;
        let found = repo
            .query(doc! { "label": { "$regex": "zy", "$options": "i" } }, Some(doc! { "weight": -1 }))
            .await
            .unwrap();
        let codes: Vec<_> = found.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_unique_conflict() {
        let repo = seeded().await;
        let err = repo.insert(&item("a", "dup", 9)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict));
        assert_eq!(repo.count(doc! {}).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_set_only_touches_given_fields() {
        let repo = seeded().await;
        let matched = repo.update_one(doc! { "code": "b" }, doc! { "$set": { "weight": 7 } }).await.unwrap();
        assert_eq!(matched, 1);
        let b = repo.find_one(doc! { "code": "b" }).await.unwrap().unwrap();
        assert_eq!(b, item("b", "alpha", 7));
        let missing = repo.update_one(doc! { "code": "zz" }, doc! { "$set": { "weight": 7 } }).await.unwrap();
        assert_eq!(missing, 0);
    }
}
