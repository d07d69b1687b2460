use biz_service::app_context::AppContext;
use biz_service::biz_service::catalog_feed::HttpCatalogFeed;
use common::config::AppConfig;
use log::{LevelFilter, warn};
use std::str::FromStr;

const DEFAULT_CONFIG_FILE: &str = "main-config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 读取配置文件
    let file = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let app_cfg = AppConfig::new(Some(&file))?;
    //初始化日志
    init_log(&app_cfg);
    warn!("Starting with database {}", app_cfg.get_database().db_name);

    let feed = HttpCatalogFeed::new(&app_cfg.get_seed().characters_url)?;
    let _ctx = AppContext::connect(&app_cfg, &feed).await;
    // 数据层由上层调用，这里只保持进程存活直到收到中断信号
    std::future::pending::<()>().await;
    Ok(())
}

/// `RUST_LOG` 优先，其次使用配置中的级别
fn init_log(config: &AppConfig) {
    let mut builder = env_logger::Builder::new();
    let level = LevelFilter::from_str(&config.get_sys().log_level).unwrap_or(LevelFilter::Info);
    builder.filter_level(level);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.init();
}
