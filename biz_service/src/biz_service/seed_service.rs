use crate::biz_service::catalog_feed::CatalogFeed;
use crate::biz_service::character_service::CharacterService;
use crate::biz_service::user_service::UserService;
use crate::entitys::user_entity::UserRole;
use common::errors::AppResult;
use log::{info, warn};

/// 空库时创建的默认账号
pub const DEFAULT_USERS: [(&str, &str, UserRole); 2] =
    [("admin", "admin123", UserRole::Admin), ("user", "user123", UserRole::User)];

/// 用户集合为空时写入默认账号，返回是否至少创建了一个
pub async fn create_default_users(users: &UserService) -> AppResult<bool> {
    if !users.is_empty().await? {
        return Ok(false);
    }
    let mut created = 0;
    for (username, password, role) in DEFAULT_USERS {
        if users.register_user(username, password, role).await? {
            created += 1;
        } else {
            warn!("default user {} was not created", username);
        }
    }
    if created == DEFAULT_USERS.len() {
        info!("Default users created successfully.");
    }
    Ok(created > 0)
}

/// 角色集合为空时从数据源导入，返回导入条数。
/// 非事务：判空和写入之间中断会留下部分数据，下次启动只看集合是否为空
pub async fn load_characters(characters: &CharacterService, feed: &dyn CatalogFeed) -> AppResult<usize> {
    if !characters.is_empty().await? {
        return Ok(0);
    }
    info!("Characters collection is empty, importing from feed");
    let list = feed.fetch().await?;
    characters.import_characters(&list).await?;
    info!("Imported {} characters", list.len());
    Ok(list.len())
}
