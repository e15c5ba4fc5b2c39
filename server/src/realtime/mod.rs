//! 实时中继 - Socket.IO 房间广播
//!
//! # 房间约定
//!
//! | 房间 | 成员 | 用途 |
//! |------|------|------|
//! | `org:<org_id>` | 租户全体在线员工 | 订单/桌台/商品变更广播 |
//! | `role:<org_id>:<role>` | 租户内某角色 | 呼叫服务员、库存告警 |
//! | `user:<user_id>` | 单个用户的所有连接 | 定向通知 |
//!
//! 角色房间带租户前缀，跨租户的同名角色互不可见。
//!
//! 广播句柄 [`RelayService`] 由 [`crate::core::ServerState`] 持有并显式
//! 注入调用方，事务提交后才发事件；发送失败只记日志。

pub mod handlers;

use serde::Serialize;
use socketioxide::SocketIo;

pub use handlers::register;

/// Socket.IO 广播中继
#[derive(Clone)]
pub struct RelayService {
    io: SocketIo,
}

impl RelayService {
    pub fn new(io: SocketIo) -> Self {
        Self { io }
    }

    /// 底层 Socket.IO 句柄 (注册命名空间用)
    pub fn io(&self) -> &SocketIo {
        &self.io
    }

    /// 组织房间名
    pub fn org_room(org_id: &str) -> String {
        format!("org:{org_id}")
    }

    /// 角色房间名 (租户内)
    pub fn role_room(org_id: &str, role: &str) -> String {
        format!("role:{org_id}:{role}")
    }

    /// 用户房间名
    pub fn user_room(user_id: &str) -> String {
        format!("user:{user_id}")
    }

    /// 广播到整个组织
    pub async fn emit_to_org<T: Serialize>(&self, org_id: &str, event: &str, data: &T) {
        if let Err(e) = self.io.to(Self::org_room(org_id)).emit(event, data).await {
            tracing::warn!(event, org_id, error = %e, "Broadcast to organization failed");
        }
    }

    /// 广播到租户内某一角色
    pub async fn emit_to_role<T: Serialize>(
        &self,
        org_id: &str,
        role: &str,
        event: &str,
        data: &T,
    ) {
        if let Err(e) = self
            .io
            .to(Self::role_room(org_id, role))
            .emit(event, data)
            .await
        {
            tracing::warn!(event, org_id, role, error = %e, "Broadcast to role failed");
        }
    }

    /// 定向发送给某个用户的所有连接
    pub async fn emit_to_user<T: Serialize>(&self, user_id: &str, event: &str, data: &T) {
        if let Err(e) = self.io.to(Self::user_room(user_id)).emit(event, data).await {
            tracing::warn!(event, user_id, error = %e, "Broadcast to user failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_names_are_tenant_scoped() {
        assert_eq!(RelayService::org_room("o1"), "org:o1");
        assert_eq!(RelayService::role_room("o1", "waiter"), "role:o1:waiter");
        assert_eq!(RelayService::user_room("u9"), "user:u9");
    }
}
