use common::errors::AppResult;
use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub const CHARACTER_COLLECTION: &str = "Characters";

/// 角色档案，`id` 由数据源分配，其余未声明的字段原样保存在 `extra`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, MongoDeriveMongoIndex)]
#[mongo_index(fields["id"], unique, name("uk_characters_id"))]
pub struct CharacterEntity {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birthdate: String,
    /// 结构由数据源决定，不做约束
    #[serde(default)]
    pub abilities: Bson,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub available: bool,
    #[serde(flatten)]
    pub extra: Document,
}

/// 局部更新，只有 `Some` 的字段和 `extra` 会写入 `$set`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CharacterUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abilities: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(flatten)]
    pub extra: Document,
}

impl CharacterUpdate {
    pub fn available(available: bool) -> Self {
        Self { available: Some(available), ..Default::default() }
    }

    /// 标识字段不可修改，统一剔除
    pub fn to_set_document(&self) -> AppResult<Document> {
        let mut set = bson::to_document(self)?;
        set.remove("id");
        set.remove("_id");
        Ok(set)
    }
}

impl From<CharacterEntity> for CharacterUpdate {
    fn from(c: CharacterEntity) -> Self {
        Self {
            name: Some(c.name),
            birthdate: Some(c.birthdate),
            abilities: Some(c.abilities),
            role: Some(c.role),
            available: Some(c.available),
            extra: c.extra,
        }
    }
}

/// 可排序的列，`abilities` 和查看列只用于展示
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, AsRefStr, Display, EnumIter, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Birthdate,
    Role,
    Available,
}

impl SortField {
    pub const ALL: [SortField; 4] = [SortField::Name, SortField::Birthdate, SortField::Role, SortField::Available];

    pub fn label(&self) -> &'static str {
        match self {
            SortField::Name => "NAME",
            SortField::Birthdate => "BIRTHDATE",
            SortField::Role => "ROLE",
            SortField::Available => "AVAILABLE",
        }
    }
}

pub fn character_index_models() -> Vec<mongodb::IndexModel> {
    CharacterEntity::index_models()
}
