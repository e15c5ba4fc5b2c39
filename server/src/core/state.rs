use std::sync::Arc;

use socketioxide::SocketIo;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::cache::CacheService;
use crate::core::Config;
use crate::db::DbService;
use crate::realtime::RelayService;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是后端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc / 内部共享句柄实现浅拷贝，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | SqlitePool | SQLite 连接池 |
/// | cache | CacheService | 内存缓存 (moka) |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | relay | RelayService | Socket.IO 广播中继 |
///
/// 广播句柄通过 `relay` 显式传递，取代原实现中的进程级全局 io 引用。
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub db: SqlitePool,
    /// 内存缓存
    pub cache: CacheService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// Socket.IO 广播中继
    pub relay: RelayService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库 (连接池 + 迁移)
    /// 2. 缓存
    /// 3. JWT 服务
    /// 4. 广播中继 (包装传入的 Socket.IO 句柄)
    pub async fn initialize(config: &Config, io: SocketIo) -> anyhow::Result<Self> {
        let db_service = DbService::new(&config.database_path).await?;

        Ok(Self {
            config: config.clone(),
            db: db_service.pool,
            cache: CacheService::new(config.cache_capacity),
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            relay: RelayService::new(io),
        })
    }

    /// 获取数据库连接池
    pub fn get_db(&self) -> SqlitePool {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
