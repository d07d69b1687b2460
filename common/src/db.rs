use crate::config::DatabaseConfig;
use crate::errors::AppResult;
use log::info;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};

/// 进程级数据库句柄，启动时创建一次，显式传给各个 service
#[derive(Clone, Debug)]
pub struct Db {
    client: Client,
    db: Database,
}

impl Db {
    /// 解析连接串并 ping 一次，确保连接可用
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let db = Self::open(config).await?;
        db.db.run_command(doc! { "ping": 1 }).await?;
        info!("MongoDB connected, database: {}", config.db_name);
        Ok(db)
    }

    /// 只创建客户端，不发起网络请求
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        let options = ClientOptions::parse(&config.url).await?;
        let client = Client::with_options(options)?;
        let db = client.database(&config.db_name);
        Ok(Self { client, db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// 关闭客户端，等待进行中的操作结束
    pub async fn close(self) {
        self.client.shutdown().await;
    }
}
