use crate::entitys::character_entity::{CharacterEntity, CharacterUpdate, SortField, CHARACTER_COLLECTION};
use common::db::Db;
use common::errors::{AppError, AppResult};
use common::query_builder::QueryBuilder;
use common::repository_util::{BaseRepository, OrderType, Repository};
use log::error;
use mongodb::bson::doc;
use std::str::FromStr;
use std::sync::Arc;

pub struct CharacterService {
    pub dao: Arc<dyn Repository<CharacterEntity>>,
}

impl CharacterService {
    pub fn new(db: &Db) -> Self {
        let collection = db.collection(CHARACTER_COLLECTION);
        Self::with_repository(Arc::new(BaseRepository::new(collection)))
    }

    pub fn with_repository(dao: Arc<dyn Repository<CharacterEntity>>) -> Self {
        Self { dao }
    }

    /// 全量返回，按存储顺序
    pub async fn get_characters(&self) -> AppResult<Vec<CharacterEntity>> {
        self.dao.query_all().await
    }

    /// `search_query` 为空时不过滤；否则按名称做大小写不敏感的子串匹配
    pub async fn search_and_sort_characters(
        &self,
        sort_field: SortField,
        sort_direction: OrderType,
        search_query: &str,
    ) -> AppResult<Vec<CharacterEntity>> {
        let filter = QueryBuilder::new().contains_ignore_case_opt("name", search_query).build();
        let field: &str = sort_field.as_ref();
        let sort = doc! { field: sort_direction.as_sort_value() };
        self.dao.query(filter, Some(sort)).await.inspect_err(|e| {
            error!("Error searching and sorting characters: {:?}", e);
        })
    }

    /// 调用方传入的原始排序参数，未知字段或方向直接拒绝
    pub async fn search_and_sort_raw(
        &self,
        sort_field: &str,
        sort_direction: i32,
        search_query: &str,
    ) -> AppResult<Vec<CharacterEntity>> {
        let field = SortField::from_str(sort_field)
            .map_err(|_| AppError::Validation(format!("unsupported sort field: {}", sort_field)))?;
        let direction = OrderType::try_from(sort_direction)?;
        self.search_and_sort_characters(field, direction, search_query).await
    }

    pub async fn get_character_by_id(&self, id: &str) -> AppResult<Option<CharacterEntity>> {
        self.dao.find_one(doc! { "id": id }).await
    }

    /// 仅覆盖 `update` 中出现的字段，返回匹配条数；并发更新以最后一次为准
    pub async fn update_character(&self, id: &str, update: &CharacterUpdate) -> AppResult<u64> {
        let set = update.to_set_document()?;
        if set.is_empty() {
            return Ok(0);
        }
        self.dao.update_one(doc! { "id": id }, doc! { "$set": set }).await.inspect_err(|e| {
            error!("Error updating character {}: {:?}", id, e);
        })
    }

    pub async fn is_empty(&self) -> AppResult<bool> {
        Ok(self.dao.count(doc! {}).await? == 0)
    }

    pub async fn import_characters(&self, characters: &[CharacterEntity]) -> AppResult<()> {
        self.dao.insert_many(characters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitys::character_entity::character_index_models;
    use common::index_trait::unique_keys_of;
    use common::memory_repository::MemoryRepository;
    use mongodb::bson::Bson;

    fn character(id: &str, name: &str, role: &str, available: bool) -> CharacterEntity {
        CharacterEntity {
            id: id.to_string(),
            name: name.to_string(),
            birthdate: format!("2000-01-0{}", id),
            abilities: Bson::Array(vec![Bson::String(format!("{}-ult", name))]),
            role: role.to_string(),
            available,
            ..Default::default()
        }
    }

    async fn service() -> CharacterService {
        let repo: MemoryRepository<CharacterEntity> = MemoryRepository::new(unique_keys_of(&character_index_models()));
        let service = CharacterService::with_repository(Arc::new(repo));
        service
            .import_characters(&[
                character("1", "Yoru", "Duelist", true),
                character("2", "Zyra", "Initiator", false),
                character("3", "Breach", "Initiator", true),
                character("4", "Lazy Sage", "Sentinel", true),
                character("5", "Kayo", "Initiator", false),
            ])
            .await
            .unwrap();
        service
    }

    fn names(list: &[CharacterEntity]) -> Vec<&str> {
        list.iter().map(|c| c.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_query_returns_everything() {
        let service = service().await;
        let all = service.get_characters().await.unwrap();
        assert_eq!(all.len(), 5);
        let mut searched = service.search_and_sort_characters(SortField::Role, OrderType::Desc, "").await.unwrap();
        let mut all_ids: Vec<_> = all.iter().map(|c| c.id.clone()).collect();
        let mut searched_ids: Vec<_> = searched.drain(..).map(|c| c.id).collect();
        all_ids.sort();
        searched_ids.sort();
        assert_eq!(all_ids, searched_ids);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring_sorted() {
        let service = service().await;
        let found = service.search_and_sort_characters(SortField::Name, OrderType::Asc, "zy").await.unwrap();
        assert_eq!(names(&found), vec!["Lazy Sage", "Zyra"]);
        let found = service.search_and_sort_characters(SortField::Name, OrderType::Desc, "ZY").await.unwrap();
        assert_eq!(names(&found), vec!["Zyra", "Lazy Sage"]);
    }

    #[tokio::test]
    async fn test_search_treats_query_literally() {
        let service = service().await;
        let found = service.search_and_sort_characters(SortField::Name, OrderType::Asc, "y.").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_sort_by_boolean_field() {
        let service = service().await;
        let found = service.search_and_sort_characters(SortField::Available, OrderType::Asc, "").await.unwrap();
        let flags: Vec<bool> = found.iter().map(|c| c.available).collect();
        assert_eq!(flags, vec![false, false, true, true, true]);
    }

    #[tokio::test]
    async fn test_raw_parameters_are_validated() {
        let service = service().await;
        let found = service.search_and_sort_raw("name", -1, "a").await.unwrap();
        assert_eq!(names(&found), vec!["Zyra", "Lazy Sage", "Kayo", "Breach"]);
        let err = service.search_and_sort_raw("abilities", 1, "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = service.search_and_sort_raw("name", 0, "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let service = service().await;
        let breach = service.get_character_by_id("3").await.unwrap().unwrap();
        assert_eq!(breach.name, "Breach");
        assert!(breach.oid.is_some());
        assert!(service.get_character_by_id("404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let service = service().await;
        let before = service.get_character_by_id("1").await.unwrap().unwrap();
        let matched = service.update_character("1", &CharacterUpdate::available(false)).await.unwrap();
        assert_eq!(matched, 1);
        let after = service.get_character_by_id("1").await.unwrap().unwrap();
        assert!(!after.available);
        assert_eq!(after, CharacterEntity { available: false, ..before });
    }

    #[tokio::test]
    async fn test_full_update_from_entity() {
        let service = service().await;
        let mut edited = service.get_character_by_id("2").await.unwrap().unwrap();
        edited.role = "Controller".to_string();
        edited.extra.insert("origin", "Unknown");
        service.update_character("2", &CharacterUpdate::from(edited.clone())).await.unwrap();
        let after = service.get_character_by_id("2").await.unwrap().unwrap();
        assert_eq!(after, edited);
    }

    #[tokio::test]
    async fn test_update_unknown_id_or_nothing() {
        let service = service().await;
        assert_eq!(service.update_character("404", &CharacterUpdate::available(true)).await.unwrap(), 0);
        assert_eq!(service.update_character("1", &CharacterUpdate::default()).await.unwrap(), 0);
    }
}
