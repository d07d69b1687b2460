use common::errors::AppResult;
use mongodb::bson::Document;
use mongodb::{Collection, IndexModel};

/// 按名称比对，只创建尚不存在的索引
pub async fn index_create(coll: &Collection<Document>, target_list: Vec<IndexModel>) -> AppResult<()> {
    // 集合还不存在时 listIndexes 会报 NamespaceNotFound，视为没有索引
    let existing = coll.list_index_names().await.unwrap_or_default();
    for target in missing_indexes(&existing, target_list) {
        match coll.create_index(target.clone()).await {
            Ok(_) => log::info!("✅ 创建索引成功: {} {}", coll.name(), target.keys),
            Err(e) => {
                log::error!("❌ 创建索引失败: {} {:?}", coll.name(), e);
                return Err(e.into());
            }
        }
    }
    Ok(())
}

/// 未命名的索引无法比对，总是交给服务端（同定义重复创建是幂等的）
pub fn missing_indexes(existing: &[String], target_list: Vec<IndexModel>) -> Vec<IndexModel> {
    target_list
        .into_iter()
        .filter(|target| match target.options.as_ref().and_then(|o| o.name.as_ref()) {
            Some(name) => !existing.contains(name),
            None => true,
        })
        .collect()
}
