pub mod app_context;
pub mod biz_service;
pub mod entitys;
pub mod util;
