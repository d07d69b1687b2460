use mongodb::IndexModel;

/// 实体声明的索引，由 `#[derive(MongoIndexModelProvider)]` 生成
pub trait MongoIndexModelProvider {
    fn index_models() -> Vec<IndexModel>;
}

/// 每个唯一索引的字段组合
pub fn unique_keys_of(models: &[IndexModel]) -> Vec<Vec<String>> {
    models
        .iter()
        .filter(|m| m.options.as_ref().and_then(|o| o.unique).unwrap_or(false))
        .map(|m| m.keys.keys().cloned().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use mongodb::options::IndexOptions;

    #[test]
    fn test_only_unique_indexes_are_reported() {
        let models = vec![
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder().keys(doc! { "role": 1 }).build(),
        ];
        assert_eq!(unique_keys_of(&models), vec![vec!["username".to_string()]]);
    }
}
