//! Socket.IO 命名空间与事件处理
//!
//! 握手认证复用 REST 的令牌校验：验证 JWT、查黑名单、回源确认用户
//! 仍然在职，然后加入 `org:` / `role:` / `user:` 三个房间。事件级的
//! 能力检查与 REST 中间件走同一个
//! [`CurrentUser::has_permission`] 入口。

use serde::Deserialize;
use serde_json::Value;
use socketioxide::extract::{SocketRef, TryData};

use chrono::Utc;
use shared::events::{
    InventoryAlertEvent, ProductStatusChangedEvent, SocketErrorEvent, TableStatusChangedEvent,
    WaiterCalledEvent, client_event, event,
};
use shared::status::{OrderItemStatus, ProductStatus, TableStatus};

use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::db::models::User;
use crate::db::repository::{DiningTableRepository, ProductRepository};
use crate::orders;
use crate::security_log;
use crate::utils::AppError;

use super::RelayService;

/// 握手时客户端在 auth 载荷里携带的令牌
#[derive(Debug, Deserialize)]
struct AuthPayload {
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateItemStatusPayload {
    order_item_id: String,
    status: OrderItemStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTableStatusPayload {
    table_id: String,
    status: TableStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProductAvailabilityPayload {
    product_id: String,
    status: ProductStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallWaiterPayload {
    table_id: String,
    message: Option<String>,
}

/// 注册根命名空间。
pub fn register(state: &ServerState) {
    let io = state.relay.io().clone();
    let state = state.clone();
    io.ns("/", move |socket: SocketRef, auth: TryData<AuthPayload>| {
        let state = state.clone();
        async move {
            on_connect(socket, auth, state).await;
        }
    });
}

async fn on_connect(socket: SocketRef, TryData(auth): TryData<AuthPayload>, state: ServerState) {
    let user = match authenticate(&state, auth).await {
        Ok(user) => user,
        Err(e) => {
            security_log!("WARN", "socket_auth_failed", error = format!("{}", e));
            let _ = socket.emit(
                event::ERROR,
                &SocketErrorEvent {
                    message: "Authentication failed".to_string(),
                },
            );
            socket.disconnect().ok();
            return;
        }
    };

    tracing::info!(
        user_id = %user.id,
        organization_id = %user.organization_id,
        role = %user.role,
        "Socket connected"
    );

    let _ = socket.join(RelayService::org_room(&user.organization_id));
    let _ = socket.join(RelayService::role_room(&user.organization_id, &user.role));
    let _ = socket.join(RelayService::user_room(&user.id));

    socket.extensions.insert(user);

    socket.on(
        client_event::UPDATE_ORDER_ITEM_STATUS,
        {
            let state = state.clone();
            move |socket: SocketRef, TryData(data): TryData<UpdateItemStatusPayload>| {
                let state = state.clone();
                async move { on_update_item_status(socket, data, state).await }
            }
        },
    );

    socket.on(
        client_event::UPDATE_TABLE_STATUS,
        {
            let state = state.clone();
            move |socket: SocketRef, TryData(data): TryData<UpdateTableStatusPayload>| {
                let state = state.clone();
                async move { on_update_table_status(socket, data, state).await }
            }
        },
    );

    socket.on(
        client_event::UPDATE_PRODUCT_AVAILABILITY,
        {
            let state = state.clone();
            move |socket: SocketRef, TryData(data): TryData<UpdateProductAvailabilityPayload>| {
                let state = state.clone();
                async move { on_update_product_availability(socket, data, state).await }
            }
        },
    );

    socket.on(
        client_event::CALL_WAITER,
        {
            let state = state.clone();
            move |socket: SocketRef, TryData(data): TryData<CallWaiterPayload>| {
                let state = state.clone();
                async move { on_call_waiter(socket, data, state).await }
            }
        },
    );

    socket.on(client_event::INVENTORY_ALERT, {
        let state = state.clone();
        move |socket: SocketRef, TryData(data): TryData<Value>| {
            let state = state.clone();
            async move { on_inventory_alert(socket, data, state).await }
        }
    });

    socket.on_disconnect(|socket: SocketRef| async move {
        let user_id = socket
            .extensions
            .get::<CurrentUser>()
            .map(|u| u.id.clone())
            .unwrap_or_default();
        tracing::info!(user_id = %user_id, "Socket disconnected");
    });
}

/// 握手认证：JWT 校验 + 黑名单 + 回源确认用户在职。
async fn authenticate(
    state: &ServerState,
    auth: Result<AuthPayload, impl std::error::Error>,
) -> Result<CurrentUser, AppError> {
    let payload = auth.map_err(|_| AppError::Unauthorized)?;

    let blacklist_key = format!("blacklist:{}", payload.token);
    if state.cache.get(&blacklist_key).await.is_some() {
        return Err(AppError::invalid_token("Token has been revoked"));
    }

    let claims = state
        .jwt_service
        .validate_token(&payload.token)
        .map_err(|e| AppError::invalid_token(e.to_string()))?;

    // 令牌有效期内用户可能已被停用，连接时回源复核
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ? AND status = 'active'")
        .bind(&claims.sub)
        .fetch_optional(&state.db)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::Unauthorized)?;

    let mut current = CurrentUser::from(claims);
    // 以数据库为准，覆盖令牌里的租户与角色
    current.organization_id = user.organization_id;
    current.role = user.role.clone();
    current.permissions = permissions::default_permissions(&user.role);
    Ok(current)
}

fn require_socket_user(socket: &SocketRef) -> Option<CurrentUser> {
    socket.extensions.get::<CurrentUser>()
}

fn reject(socket: &SocketRef, message: &str) {
    let _ = socket.emit(
        event::ERROR,
        &SocketErrorEvent {
            message: message.to_string(),
        },
    );
}

async fn on_update_item_status(
    socket: SocketRef,
    data: Result<UpdateItemStatusPayload, impl std::error::Error>,
    state: ServerState,
) {
    let Some(user) = require_socket_user(&socket) else {
        return reject(&socket, "Not authenticated");
    };
    let Ok(payload) = data else {
        return reject(&socket, "Invalid payload");
    };
    if !user.has_permission(permissions::ORDERS_UPDATE_STATUS) {
        return reject(&socket, "Unauthorized to update order status");
    }

    if let Err(e) =
        orders::update_item_status_by_item_id(&state, &user, &payload.order_item_id, payload.status)
            .await
    {
        tracing::warn!(error = %e, "Socket item status update failed");
        reject(&socket, &e.to_string());
    }
}

async fn on_update_table_status(
    socket: SocketRef,
    data: Result<UpdateTableStatusPayload, impl std::error::Error>,
    state: ServerState,
) {
    let Some(user) = require_socket_user(&socket) else {
        return reject(&socket, "Not authenticated");
    };
    let Ok(payload) = data else {
        return reject(&socket, "Invalid payload");
    };
    if !user.has_permission(permissions::TABLES_MANAGE) {
        return reject(&socket, "Unauthorized to update table status");
    }

    let repo = DiningTableRepository::new(state.db.clone());
    match repo
        .set_status(&user.organization_id, &payload.table_id, payload.status)
        .await
    {
        Ok(Some(table)) => {
            state
                .relay
                .emit_to_org(
                    &user.organization_id,
                    event::TABLE_STATUS_CHANGED,
                    &TableStatusChangedEvent {
                        table_id: table.id,
                        table_number: table.number,
                        status: payload.status,
                        timestamp: Utc::now(),
                    },
                )
                .await;
        }
        Ok(None) => reject(&socket, "Table not found"),
        Err(e) => {
            tracing::warn!(error = %e, "Socket table status update failed");
            reject(&socket, "Failed to update table status");
        }
    }
}

async fn on_update_product_availability(
    socket: SocketRef,
    data: Result<UpdateProductAvailabilityPayload, impl std::error::Error>,
    state: ServerState,
) {
    let Some(user) = require_socket_user(&socket) else {
        return reject(&socket, "Not authenticated");
    };
    let Ok(payload) = data else {
        return reject(&socket, "Invalid payload");
    };
    if !user.has_permission(permissions::PRODUCTS_MANAGE) {
        return reject(&socket, "Unauthorized to update product availability");
    }

    let repo = ProductRepository::new(state.db.clone());
    match repo
        .set_status(&user.organization_id, &payload.product_id, payload.status)
        .await
    {
        Ok(Some(product)) => {
            state.cache.delete(&format!("product:{}", product.id)).await;
            state
                .cache
                .delete_prefix(&format!("products:{}:", user.organization_id));

            state
                .relay
                .emit_to_org(
                    &user.organization_id,
                    event::PRODUCT_STATUS_CHANGED,
                    &ProductStatusChangedEvent {
                        product_id: product.id,
                        product_name: product.name,
                        status: payload.status,
                        timestamp: Utc::now(),
                    },
                )
                .await;
        }
        Ok(None) => reject(&socket, "Product not found"),
        Err(e) => {
            tracing::warn!(error = %e, "Socket product availability update failed");
            reject(&socket, "Failed to update product availability");
        }
    }
}

async fn on_call_waiter(
    socket: SocketRef,
    data: Result<CallWaiterPayload, impl std::error::Error>,
    state: ServerState,
) {
    let Some(user) = require_socket_user(&socket) else {
        return reject(&socket, "Not authenticated");
    };
    let Ok(payload) = data else {
        return reject(&socket, "Invalid payload");
    };

    let repo = DiningTableRepository::new(state.db.clone());
    let table = match repo.find_by_id(&user.organization_id, &payload.table_id).await {
        Ok(Some(table)) => table,
        Ok(None) => return reject(&socket, "Table not found"),
        Err(e) => {
            tracing::warn!(error = %e, "Call waiter lookup failed");
            return reject(&socket, "Failed to call waiter");
        }
    };

    let ev = WaiterCalledEvent {
        table_id: table.id,
        table_number: table.number,
        table_name: table.name,
        message: payload
            .message
            .unwrap_or_else(|| "Assistance needed".to_string()),
        timestamp: Utc::now(),
    };

    // 服务员和经理都收到呼叫
    state
        .relay
        .emit_to_role(&user.organization_id, "waiter", event::WAITER_CALLED, &ev)
        .await;
    state
        .relay
        .emit_to_role(&user.organization_id, "manager", event::WAITER_CALLED, &ev)
        .await;
}

async fn on_inventory_alert(
    socket: SocketRef,
    data: Result<Value, impl std::error::Error>,
    state: ServerState,
) {
    let Some(user) = require_socket_user(&socket) else {
        return reject(&socket, "Not authenticated");
    };
    let Ok(payload) = data else {
        return reject(&socket, "Invalid payload");
    };
    if !user.has_permission(permissions::PRODUCTS_MANAGE) {
        return reject(&socket, "Unauthorized to send inventory alerts");
    }

    let ev = InventoryAlertEvent {
        data: payload,
        timestamp: Utc::now(),
    };
    state
        .relay
        .emit_to_role(&user.organization_id, "manager", event::INVENTORY_ALERT, &ev)
        .await;
    state
        .relay
        .emit_to_role(&user.organization_id, "admin", event::INVENTORY_ALERT, &ev)
        .await;
}
