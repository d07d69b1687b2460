pub mod catalog_feed;
pub mod character_service;
pub mod seed_service;
pub mod user_service;
