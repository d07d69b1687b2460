pub mod index_trait;
#[cfg(any(test, feature = "testing"))]
pub mod memory_repository;
pub mod query_builder;
pub mod repository_util;
