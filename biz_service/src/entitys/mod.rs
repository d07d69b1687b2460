pub mod character_entity;
pub mod user_entity;
