use crate::biz_service::catalog_feed::CatalogFeed;
use crate::biz_service::character_service::CharacterService;
use crate::biz_service::seed_service::{create_default_users, load_characters};
use crate::biz_service::user_service::UserService;
use crate::entitys::character_entity::{character_index_models, CHARACTER_COLLECTION};
use crate::entitys::user_entity::{user_index_models, USER_COLLECTION};
use crate::util::db_index_util::index_create;
use common::config::AppConfig;
use common::db::Db;
use common::errors::AppResult;
use log::{error, info};
use mongodb::bson::Document;
use std::sync::Arc;

/// 进程级上下文：一个数据库句柄和基于它的 service
#[derive(Clone)]
pub struct AppContext {
    pub db: Db,
    pub character_service: Arc<CharacterService>,
    pub user_service: Arc<UserService>,
}

impl AppContext {
    pub fn new(db: Db) -> Self {
        let character_service = Arc::new(CharacterService::new(&db));
        let user_service = Arc::new(UserService::new(&db));
        Self { db, character_service, user_service }
    }

    /// 连接并初始化数据，失败只记录日志：
    /// 连不上返回 `None`；初始化数据失败时仍返回上下文，处于部分初始化状态。
    /// 中断信号处理只在初始化成功后注册
    pub async fn connect(config: &AppConfig, feed: &dyn CatalogFeed) -> Option<Self> {
        let db = match Db::connect(&config.get_database()).await {
            Ok(db) => db,
            Err(e) => {
                error!("{:?}", e);
                return None;
            }
        };
        let ctx = Self::new(db);
        let seeded = ctx.seed(feed).await;
        ctx.finish_connect(seeded);
        Some(ctx)
    }

    /// 返回是否注册了中断处理
    fn finish_connect(&self, seeded: AppResult<()>) -> bool {
        match seeded {
            Ok(()) => {
                info!("Connected to database");
                self.register_shutdown();
                true
            }
            Err(e) => {
                error!("{:?}", e);
                false
            }
        }
    }

    /// 建索引 -> 默认账号 -> 角色数据，默认账号失败不影响后续步骤
    pub async fn seed(&self, feed: &dyn CatalogFeed) -> AppResult<()> {
        self.ensure_indexes().await;
        if let Err(e) = create_default_users(&self.user_service).await {
            error!("Error creating default users: {:?}", e);
        }
        load_characters(&self.character_service, feed).await?;
        Ok(())
    }

    async fn ensure_indexes(&self) {
        let targets = [(USER_COLLECTION, user_index_models()), (CHARACTER_COLLECTION, character_index_models())];
        for (name, models) in targets {
            let coll = self.db.collection::<Document>(name);
            if let Err(e) = index_create(&coll, models).await {
                error!("ensure indexes on {} failed: {:?}", name, e);
            }
        }
    }

    /// 收到中断信号后关闭连接并以 0 退出
    pub fn register_shutdown(&self) {
        let db = self.db.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("listen for interrupt failed: {:?}", e);
                return;
            }
            db.close().await;
            info!("Disconnected from database");
            std::process::exit(0);
        });
    }
}
