use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub const USER_COLLECTION: &str = "users";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, AsRefStr, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

/// 用户账号，用户名由唯一索引保证不重复
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, MongoDeriveMongoIndex)]
#[mongo_index(fields["username"], unique, name("uk_users_username"))]
pub struct UserEntity {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,
    /// 用户名（用于登录）
    pub username: String,
    /// 密码哈希（PHC 格式字符串），不保存明文
    pub password: String,
    pub role: UserRole,
}

pub fn user_index_models() -> Vec<mongodb::IndexModel> {
    UserEntity::index_models()
}
