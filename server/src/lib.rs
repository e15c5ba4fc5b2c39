//! TapTab POS Server - 餐厅/运动酒吧收银后端
//!
//! # 架构概述
//!
//! 本模块是 POS 后端的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): SQLite 关系存储 (sqlx, WAL)
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **缓存** (`cache`): moka 内存缓存 (令牌黑名单、列表缓存)
//! - **订单** (`orders`): 订单组装/定价事务与状态机
//! - **实时中继** (`realtime`): Socket.IO 房间广播
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限
//! ├── cache/         # 缓存服务
//! ├── db/            # 数据库层 (models + repository)
//! ├── orders/        # 订单组装与状态机
//! ├── realtime/      # Socket.IO 中继
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod core;
pub mod db;
pub mod orders;
pub mod realtime;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use cache::CacheService;
pub use core::{Config, Server, ServerState};
pub use realtime::RelayService;
pub use utils::{AppError, AppResult};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
  ______          ______      __
 /_  __/___ _____/_  __/___ _/ /_
  / / / __ `/ __ \/ / / __ `/ __ \
 / / / /_/ / /_/ / / / /_/ / /_/ /
/_/  \__,_/ .___/_/  \__,_/_.___/
         /_/
    "#
    );
}
