//! 认证模块 - JWT、权限与中间件
//!
//! REST 中间件和 Socket.IO 事件处理器共用同一套能力检查
//! ([`CurrentUser::has_permission`])，避免两套授权逻辑漂移。

pub mod jwt;
pub mod middleware;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, generate_refresh_token};
pub use middleware::{BearerToken, require_auth, require_permission};
pub use permissions::default_permissions;
